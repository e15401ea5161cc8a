//! Console output formatter for task outcomes and thread state

use colored::Colorize;
use dealflow_domain::{NegotiationThread, Offer, TaskId, TaskOutcome, ThreadState};
use serde_json::{Value, json};

/// Formats engine results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a task outcome
    pub fn format_outcome(task_id: &TaskId, outcome: &TaskOutcome) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!("Task {}", task_id)));
        output.push('\n');

        let status = match outcome {
            TaskOutcome::Completed { .. } => "completed".green().bold(),
            TaskOutcome::NeedsReview { .. } => "needs review".yellow().bold(),
            TaskOutcome::NoAction { .. } => "no action".blue().bold(),
            TaskOutcome::Failed { .. } => "failed".red().bold(),
        };
        output.push_str(&format!("{} {}\n", "Outcome:".cyan().bold(), status));

        if let Some(annotation) = outcome.annotation() {
            output.push_str(&format!(
                "{} {}\n",
                "Reason:".cyan().bold(),
                annotation.reason
            ));
        }
        if let TaskOutcome::Failed { error } = outcome {
            output.push_str(&format!("{} {}\n", "Error:".red().bold(), error));
        }

        if !outcome.results().is_empty() {
            output.push_str(&Self::section_header("Steps"));
            for (index, result) in outcome.results().iter().enumerate() {
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!("── {}. {} ──", index + 1, result.step).yellow().bold(),
                    Self::indent(&Self::pretty(&result.result), "  ")
                ));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format a task outcome as JSON in the persisted `{status, output}` /
    /// `{status, error}` shape
    pub fn format_outcome_json(task_id: &TaskId, outcome: &TaskOutcome) -> String {
        let value = match outcome {
            TaskOutcome::Failed { error } => json!({
                "id": task_id,
                "status": outcome.status(),
                "error": error,
            }),
            _ => json!({
                "id": task_id,
                "status": outcome.status(),
                "output": outcome.output(),
            }),
        };
        Self::pretty(&value)
    }

    /// Format a thread and its derived state
    pub fn format_thread_state(thread: &NegotiationThread, state: &ThreadState) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {} ({})\n",
            "Thread:".cyan().bold(),
            thread.id,
            thread.status
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Counterparty:".cyan().bold(),
            thread.counterparty_key
        ));

        match &state.last_offer {
            Some(offer) => output.push_str(&format!(
                "{} {}\n",
                "Last offer:".cyan().bold(),
                Self::offer_line(offer).bold()
            )),
            None => output.push_str(&format!(
                "{} {}\n",
                "Last offer:".cyan().bold(),
                "none".dimmed()
            )),
        }

        if state.history.len() > 1 {
            output.push_str(&Self::section_header("History (newest first)"));
            for offer in &state.history {
                output.push_str(&format!("  * {}\n", Self::offer_line(offer)));
            }
        }

        output
    }

    /// Format a thread and its derived state as JSON
    pub fn format_thread_state_json(thread: &NegotiationThread, state: &ThreadState) -> String {
        Self::pretty(&json!({ "thread": thread, "state": state }))
    }

    fn offer_line(offer: &Offer) -> String {
        let currency = offer.currency.as_deref().unwrap_or("");
        format!(
            "{} {} ({}, {})",
            currency,
            offer.amount,
            match offer.direction {
                dealflow_domain::MessageDirection::Inbound => "inbound",
                dealflow_domain::MessageDirection::Outbound => "outbound",
            },
            offer.observed_at.format("%Y-%m-%d %H:%M")
        )
        .trim_start()
        .to_string()
    }

    fn pretty(value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
