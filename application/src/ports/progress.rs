//! Progress notification port
//!
//! Lets a front end follow a task execution step by step.

use dealflow_domain::{Annotation, Step, TaskId, TaskOutcome};
use serde_json::Value;

/// Callbacks for progress updates during task execution
pub trait TaskProgressNotifier: Send + Sync {
    /// Called once the task is marked running, with the final plan length
    fn on_task_start(&self, _task_id: &TaskId, _total_steps: usize) {}

    /// Called when the plan was extended before the loop
    fn on_plan_extended(&self, _step: &Step) {}

    /// Called before a step's handler runs
    fn on_step_start(&self, _step: &Step, _index: usize, _total: usize) {}

    /// Called after a step's handler returned
    fn on_step_complete(&self, _step: &Step, _result: &Value) {}

    /// Called when a termination rule ended execution early
    fn on_terminated(&self, _step: &Step, _annotation: &Annotation) {}

    /// Called with the final outcome, including failures
    fn on_task_finished(&self, _task_id: &TaskId, _outcome: &TaskOutcome) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl TaskProgressNotifier for NoProgress {}
