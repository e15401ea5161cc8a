//! Execute Task use case
//!
//! Runs one stored task: resolves its policy, attaches the negotiation
//! thread when the task carries an inbound email, dispatches every plan step
//! to its registered action and records exactly one terminal write.

use crate::ports::StoreError;
use crate::ports::action_handler::{ActionError, ActionRegistry};
use crate::ports::execution_logger::{ExecutionEvent, ExecutionLogger, NoExecutionLogger};
use crate::ports::policy_supplier::{PolicyError, PolicySupplier};
use crate::ports::progress::{NoProgress, TaskProgressNotifier};
use crate::ports::task_store::{TaskStore, TaskUpdate};
use crate::ports::thread_store::ThreadStore;
use crate::use_cases::negotiation_threads::NegotiationThreadService;
use dealflow_domain::{
    CounterpartyKey, DomainError, ExecutionContext, NewThreadMessage, Plan, Step, StepResult,
    Task, TaskId, TaskOutcome, actions, evaluate_termination,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that end a task execution with `status = error`
#[derive(Error, Debug)]
pub enum ExecuteTaskError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Action '{action}' failed: {source}")]
    ActionFailed {
        action: String,
        #[source]
        source: ActionError,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("Context error: {0}")]
    Context(#[from] DomainError),
}

/// Use case for executing a stored task
pub struct ExecuteTaskUseCase<T: TaskStore, S: ThreadStore, P: PolicySupplier> {
    tasks: Arc<T>,
    threads: NegotiationThreadService<S>,
    policies: Arc<P>,
    registry: Arc<ActionRegistry>,
    logger: Arc<dyn ExecutionLogger>,
}

impl<T: TaskStore, S: ThreadStore, P: PolicySupplier> ExecuteTaskUseCase<T, S, P> {
    pub fn new(tasks: Arc<T>, threads: Arc<S>, policies: Arc<P>, registry: ActionRegistry) -> Self {
        Self {
            tasks,
            threads: NegotiationThreadService::new(threads),
            policies,
            registry: Arc::new(registry),
            logger: Arc::new(NoExecutionLogger),
        }
    }

    /// Record engine events to a structured log.
    pub fn with_logger(mut self, logger: Arc<dyn ExecutionLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Execute the task with default (no-op) progress
    pub async fn execute(&self, task_id: &TaskId) -> Result<Option<TaskOutcome>, ExecuteTaskError> {
        self.execute_with_progress(task_id, &NoProgress).await
    }

    /// Execute the task with progress callbacks.
    ///
    /// Returns `Ok(None)` without touching the store when the task does not
    /// exist. Every other path ends with one terminal write; on failure the
    /// error is persisted first and then returned.
    pub async fn execute_with_progress(
        &self,
        task_id: &TaskId,
        progress: &dyn TaskProgressNotifier,
    ) -> Result<Option<TaskOutcome>, ExecuteTaskError> {
        let Some(task) = self.tasks.get(task_id).await? else {
            info!(task_id = %task_id, "Task not found, nothing to execute");
            return Ok(None);
        };

        let outcome = match self.run(&task, progress).await {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.fail(task_id, e, progress).await),
        };

        if let Err(e) = self
            .tasks
            .update(task_id, TaskUpdate::terminal(&outcome))
            .await
        {
            return Err(self.fail(task_id, e.into(), progress).await);
        }

        match outcome.annotation() {
            Some(annotation) => info!(
                task_id = %task_id,
                status = annotation.status.as_str(),
                reason = annotation.reason.as_str(),
                "Task finished early"
            ),
            None => info!(task_id = %task_id, steps = outcome.results().len(), "Task completed"),
        }
        self.logger.log(ExecutionEvent::new(
            "task_completed",
            json!({
                "task_id": task_id.as_str(),
                "steps": outcome.results().len(),
                "annotation": outcome.annotation(),
            }),
        ));
        progress.on_task_finished(task_id, &outcome);

        Ok(Some(outcome))
    }

    async fn run(
        &self,
        task: &Task,
        progress: &dyn TaskProgressNotifier,
    ) -> Result<TaskOutcome, ExecuteTaskError> {
        let policy = self.policies.load(task.user_id.as_ref()).await?;

        self.tasks.update(&task.id, TaskUpdate::Running).await?;

        let mut plan = task.input.plan.clone();
        let mut context = ExecutionContext::new(task.input.context.clone(), policy);

        if let Some(step) = self.attach_negotiation(task, &mut plan, &mut context).await? {
            debug!(task_id = %task.id, action = %step.action, "Prepended step to plan");
            self.logger.log(ExecutionEvent::new(
                "plan_extended",
                json!({ "task_id": task.id.as_str(), "action": step.action }),
            ));
            progress.on_plan_extended(&step);
        }

        let total = plan.len();
        info!(task_id = %task.id, steps = total, "Executing task");
        self.logger.log(ExecutionEvent::new(
            "task_started",
            json!({
                "task_id": task.id.as_str(),
                "user_id": task.user_id.as_ref().map(|u| u.as_str()),
                "steps": total,
            }),
        ));
        progress.on_task_start(&task.id, total);

        let mut results = Vec::with_capacity(total);
        for (index, step) in plan.iter().enumerate() {
            let handler = self
                .registry
                .get(&step.action)
                .ok_or_else(|| ExecuteTaskError::UnknownAction(step.action.clone()))?;

            progress.on_step_start(step, index, total);
            debug!(task_id = %task.id, action = %step.action, index, "Running step");

            let result = handler
                .run(step, &mut context)
                .await
                .map_err(|source| ExecuteTaskError::ActionFailed {
                    action: step.action.clone(),
                    source,
                })?;

            progress.on_step_complete(step, &result);
            self.logger.log(ExecutionEvent::new(
                "step_completed",
                json!({
                    "task_id": task.id.as_str(),
                    "index": index,
                    "action": step.action,
                    "result": result,
                }),
            ));

            let annotation = evaluate_termination(&step.action, &result);
            results.push(StepResult::new(step.action.clone(), result));

            if let Some(annotation) = annotation {
                self.logger.log(ExecutionEvent::new(
                    "task_terminated",
                    json!({
                        "task_id": task.id.as_str(),
                        "action": step.action,
                        "status": annotation.status,
                        "reason": annotation.reason,
                    }),
                ));
                progress.on_terminated(step, &annotation);
                return Ok(TaskOutcome::terminated(results, annotation));
            }
        }

        if let Some(thread_id) = context.thread_id() {
            self.threads.close_thread(&thread_id).await?;
        }

        Ok(TaskOutcome::Completed { results })
    }

    /// Attach the negotiation thread for the task's email, if any.
    ///
    /// Returns the step prepended to `plan`, if one was.
    async fn attach_negotiation(
        &self,
        task: &Task,
        plan: &mut Plan,
        context: &mut ExecutionContext,
    ) -> Result<Option<Step>, ExecuteTaskError> {
        let (Some(user_id), Some(email)) = (task.user_id.as_ref(), context.email().cloned()) else {
            return Ok(None);
        };

        let counterparty = CounterpartyKey::from_email(&email);
        let thread = self
            .threads
            .find_or_create_thread(user_id, &counterparty)
            .await?;
        self.threads
            .record_thread_message(NewThreadMessage::inbound_from_email(
                thread.id.clone(),
                &email,
            ))
            .await?;
        let state = self.threads.get_active_thread_state(&thread.id).await?;
        context.attach_thread(&thread, &state)?;

        if state.last_offer.is_none() || plan.contains_action(actions::EVALUATE_OFFER_AGAINST_HISTORY)
        {
            return Ok(None);
        }

        let step = Step::new(actions::EVALUATE_OFFER_AGAINST_HISTORY);
        plan.prepend(step.clone());
        Ok(Some(step))
    }

    /// Persist the failure and hand the original error back.
    async fn fail(
        &self,
        task_id: &TaskId,
        err: ExecuteTaskError,
        progress: &dyn TaskProgressNotifier,
    ) -> ExecuteTaskError {
        let message = err.to_string();
        error!(task_id = %task_id, error = %message, "Task failed");

        if let Err(write_err) = self
            .tasks
            .update(
                task_id,
                TaskUpdate::Failed {
                    error: message.clone(),
                },
            )
            .await
        {
            warn!(task_id = %task_id, error = %write_err, "Could not record task failure");
        }

        self.logger.log(ExecutionEvent::new(
            "task_failed",
            json!({ "task_id": task_id.as_str(), "error": message }),
        ));
        progress.on_task_finished(task_id, &TaskOutcome::Failed { error: message });

        err
    }
}
