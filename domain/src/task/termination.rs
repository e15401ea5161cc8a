//! Early-termination rules.
//!
//! Rules match on `(action name, result shape)` only and are checked in the
//! fixed order of [`TERMINATION_RULES`]. Matching is strict: `approved` and
//! `shouldCounter` must be the JSON literal `false` (a missing field or a
//! falsy number does not match) and `riskLevel` must be exactly `"high"`.

use super::outcome::{Annotation, AnnotationStatus, TerminationReason};
use super::plan::actions;
use serde_json::Value;

/// A single `(action, result shape) -> annotation` rule.
#[derive(Debug, Clone, Copy)]
pub struct TerminationRule {
    pub action: &'static str,
    pub annotation: Annotation,
    matches: fn(&Value) -> bool,
}

impl TerminationRule {
    /// Whether this rule fires for the given step.
    pub fn applies(&self, action: &str, result: &Value) -> bool {
        self.action == action && (self.matches)(result)
    }
}

fn counter_offer_rejected(result: &Value) -> bool {
    result.get("approved") == Some(&Value::Bool(false))
}

fn high_risk_strategy(result: &Value) -> bool {
    result.pointer("/strategy/riskLevel").and_then(Value::as_str) == Some("high")
}

fn counter_not_advised(result: &Value) -> bool {
    result.get("shouldCounter") == Some(&Value::Bool(false))
}

/// Termination rules in priority order.
pub const TERMINATION_RULES: [TerminationRule; 3] = [
    TerminationRule {
        action: actions::VALIDATE_COUNTER_OFFER,
        annotation: Annotation {
            status: AnnotationStatus::NeedsReview,
            reason: TerminationReason::CounterOfferExceedsPolicy,
        },
        matches: counter_offer_rejected,
    },
    TerminationRule {
        action: actions::EVALUATE_OFFER,
        annotation: Annotation {
            status: AnnotationStatus::NeedsReview,
            reason: TerminationReason::HighRiskNegotiation,
        },
        matches: high_risk_strategy,
    },
    TerminationRule {
        action: actions::EVALUATE_OFFER_AGAINST_HISTORY,
        annotation: Annotation {
            status: AnnotationStatus::NoAction,
            reason: TerminationReason::CounterNotAdvised,
        },
        matches: counter_not_advised,
    },
];

/// Return the annotation of the first rule that fires for this step.
pub fn evaluate_termination(action: &str, result: &Value) -> Option<Annotation> {
    TERMINATION_RULES
        .iter()
        .find(|rule| rule.applies(action, result))
        .map(|rule| rule.annotation)
}
