//! Progress reporting for task execution

use colored::Colorize;
use dealflow_application::TaskProgressNotifier;
use dealflow_domain::{Annotation, Step, TaskId, TaskOutcome};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::sync::Mutex;

/// Reports progress with a step bar
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn step_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock()
            && let Some(bar) = guard.as_ref()
        {
            f(bar);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskProgressNotifier for ProgressReporter {
    fn on_task_start(&self, task_id: &TaskId, total_steps: usize) {
        let bar = ProgressBar::new(total_steps as u64);
        bar.set_style(Self::step_style());
        bar.set_prefix(format!("Task {}", task_id));
        bar.set_message("Starting...");
        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn on_step_start(&self, step: &Step, _index: usize, _total: usize) {
        self.with_bar(|bar| bar.set_message(step.action.clone()));
    }

    fn on_step_complete(&self, step: &Step, _result: &Value) {
        self.with_bar(|bar| {
            bar.set_message(format!("{} {}", "v".green(), step.action));
            bar.inc(1);
        });
    }

    fn on_terminated(&self, step: &Step, annotation: &Annotation) {
        self.with_bar(|bar| {
            bar.set_message(format!(
                "{} {} ({})",
                "!".yellow(),
                step.action,
                annotation.reason
            ))
        });
    }

    fn on_task_finished(&self, _task_id: &TaskId, outcome: &TaskOutcome) {
        let Ok(mut guard) = self.bar.lock() else {
            return;
        };
        if let Some(bar) = guard.take() {
            match outcome {
                TaskOutcome::Failed { .. } => bar.abandon_with_message("failed".red().to_string()),
                _ => bar.finish_with_message("done".green().to_string()),
            }
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl TaskProgressNotifier for SimpleProgress {
    fn on_plan_extended(&self, step: &Step) {
        println!("  {} prepended {}", "+".cyan(), step.action.bold());
    }

    fn on_task_start(&self, task_id: &TaskId, total_steps: usize) {
        println!(
            "{} {} ({} steps)",
            "->".cyan(),
            format!("Task {}", task_id).bold(),
            total_steps
        );
    }

    fn on_step_complete(&self, step: &Step, _result: &Value) {
        println!("  {} {}", "v".green(), step.action);
    }

    fn on_terminated(&self, step: &Step, annotation: &Annotation) {
        println!(
            "  {} {} stopped the plan: {} ({})",
            "!".yellow(),
            step.action,
            annotation.status.as_str(),
            annotation.reason
        );
    }

    fn on_task_finished(&self, _task_id: &TaskId, outcome: &TaskOutcome) {
        if let TaskOutcome::Failed { error } = outcome {
            println!("  {} {}", "x".red(), error);
        }
        println!();
    }
}
