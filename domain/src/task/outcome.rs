//! Task outcomes and persisted output entries.
//!
//! The task row only has a `status` column and an `output` list, so three
//! different business results (finished, needs review, no action) are all
//! stored as `success` and told apart by the trailing [`Annotation`].
//! [`TaskOutcome`] keeps them apart in code and folds back into that shape
//! through [`TaskOutcome::status`] and [`TaskOutcome::output`].

use super::entities::TaskStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of one executed step, recorded in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Action name of the step
    pub step: String,
    /// Whatever the action returned
    pub result: Value,
}

impl StepResult {
    pub fn new(step: impl Into<String>, result: Value) -> Self {
        Self {
            step: step.into(),
            result,
        }
    }
}

/// Business classification attached to an early exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationStatus {
    NeedsReview,
    NoAction,
}

impl AnnotationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationStatus::NeedsReview => "needs_review",
            AnnotationStatus::NoAction => "no_action",
        }
    }
}

/// Why execution stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    CounterOfferExceedsPolicy,
    HighRiskNegotiation,
    CounterNotAdvised,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::CounterOfferExceedsPolicy => "counter_offer_exceeds_policy",
            TerminationReason::HighRiskNegotiation => "high_risk_negotiation",
            TerminationReason::CounterNotAdvised => "counter_not_advised",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trailing `{status, reason}` object appended to the output on early exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub status: AnnotationStatus,
    pub reason: TerminationReason,
}

/// One element of a persisted task output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputEntry {
    Step(StepResult),
    Annotation(Annotation),
}

impl OutputEntry {
    pub fn as_step(&self) -> Option<&StepResult> {
        match self {
            OutputEntry::Step(step) => Some(step),
            OutputEntry::Annotation(_) => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&Annotation> {
        match self {
            OutputEntry::Annotation(annotation) => Some(annotation),
            OutputEntry::Step(_) => None,
        }
    }
}

/// Outcome of one engine execution.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// Every step ran without a termination rule firing
    Completed { results: Vec<StepResult> },
    /// A rule asked for a human to look at the negotiation
    NeedsReview {
        results: Vec<StepResult>,
        reason: TerminationReason,
    },
    /// A rule decided nothing should be sent
    NoAction {
        results: Vec<StepResult>,
        reason: TerminationReason,
    },
    /// Execution failed; the message is what gets persisted
    Failed { error: String },
}

impl TaskOutcome {
    /// Build the early-exit outcome for a matched annotation.
    pub fn terminated(results: Vec<StepResult>, annotation: Annotation) -> Self {
        match annotation.status {
            AnnotationStatus::NeedsReview => TaskOutcome::NeedsReview {
                results,
                reason: annotation.reason,
            },
            AnnotationStatus::NoAction => TaskOutcome::NoAction {
                results,
                reason: annotation.reason,
            },
        }
    }

    /// Persisted status column for this outcome.
    pub fn status(&self) -> TaskStatus {
        match self {
            TaskOutcome::Failed { .. } => TaskStatus::Error,
            _ => TaskStatus::Success,
        }
    }

    /// Trailing annotation, if this was an early exit.
    pub fn annotation(&self) -> Option<Annotation> {
        match self {
            TaskOutcome::NeedsReview { reason, .. } => Some(Annotation {
                status: AnnotationStatus::NeedsReview,
                reason: *reason,
            }),
            TaskOutcome::NoAction { reason, .. } => Some(Annotation {
                status: AnnotationStatus::NoAction,
                reason: *reason,
            }),
            _ => None,
        }
    }

    /// Step results collected before the outcome was decided.
    pub fn results(&self) -> &[StepResult] {
        match self {
            TaskOutcome::Completed { results }
            | TaskOutcome::NeedsReview { results, .. }
            | TaskOutcome::NoAction { results, .. } => results,
            TaskOutcome::Failed { .. } => &[],
        }
    }

    /// Persisted output column: results followed by the annotation, if any.
    /// `None` on failure, where only the error is written.
    pub fn output(&self) -> Option<Vec<OutputEntry>> {
        if let TaskOutcome::Failed { .. } = self {
            return None;
        }
        let mut output: Vec<OutputEntry> = self
            .results()
            .iter()
            .cloned()
            .map(OutputEntry::Step)
            .collect();
        if let Some(annotation) = self.annotation() {
            output.push(OutputEntry::Annotation(annotation));
        }
        Some(output)
    }

    /// Whether execution stopped before the end of the plan.
    pub fn is_early_exit(&self) -> bool {
        self.annotation().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_action_output_shape() {
        let outcome = TaskOutcome::terminated(
            vec![StepResult::new(
                "evaluateOfferAgainstHistory",
                json!({ "shouldCounter": false }),
            )],
            Annotation {
                status: AnnotationStatus::NoAction,
                reason: TerminationReason::CounterNotAdvised,
            },
        );

        assert_eq!(outcome.status(), TaskStatus::Success);
        assert!(outcome.is_early_exit());
        let output = serde_json::to_value(outcome.output().unwrap()).unwrap();
        assert_eq!(
            output,
            json!([
                { "step": "evaluateOfferAgainstHistory", "result": { "shouldCounter": false } },
                { "status": "no_action", "reason": "counter_not_advised" }
            ])
        );
    }

    #[test]
    fn test_completed_has_no_annotation() {
        let outcome = TaskOutcome::Completed {
            results: vec![StepResult::new("sendIntro", json!("sent"))],
        };
        assert_eq!(outcome.annotation(), None);
        assert_eq!(outcome.output().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_maps_to_error_without_output() {
        let outcome = TaskOutcome::Failed {
            error: "boom".to_string(),
        };
        assert_eq!(outcome.status(), TaskStatus::Error);
        assert!(outcome.output().is_none());
        assert!(outcome.results().is_empty());
    }

    #[test]
    fn test_output_entries_round_trip_untagged() {
        let entries: Vec<OutputEntry> = serde_json::from_value(json!([
            { "step": "evaluateOffer", "result": { "strategy": { "riskLevel": "high" } } },
            { "status": "needs_review", "reason": "high_risk_negotiation" }
        ]))
        .unwrap();

        assert_eq!(entries[0].as_step().unwrap().step, "evaluateOffer");
        assert_eq!(
            entries[1].as_annotation().unwrap().reason,
            TerminationReason::HighRiskNegotiation
        );
    }
}
