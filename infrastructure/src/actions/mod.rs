//! Built-in negotiation actions.
//!
//! | Action | Reads | Writes |
//! |---|---|---|
//! | `evaluateOffer` | `offer`, `threadState`, `email`, `policy` | `offer`, `strategy` |
//! | `evaluateOfferAgainstHistory` | `threadState`, `policy` | `historyAssessment`, `counterOffer` |
//! | `validateCounterOffer` | step `amount`, `counterOffer`, `offer`, `threadState`, `policy` | nothing |
//! | `draftReply` | `email`, `offer`, `counterOffer`, `policy` | `draft` |
//!
//! Amounts in the context are either plain numbers or objects with an
//! `amount` field.

mod draft_reply;
mod evaluate_offer;
mod history;
mod validate_counter;

pub use draft_reply::DraftReply;
pub use evaluate_offer::EvaluateOffer;
pub use history::EvaluateOfferAgainstHistory;
pub use validate_counter::ValidateCounterOffer;

use dealflow_application::{ActionError, ActionRegistry};
use dealflow_domain::{ExecutionContext, NegotiationPolicy, Policy, actions};
use serde_json::Value;

/// Registry with every built-in action under its canonical name.
pub fn builtin_registry() -> ActionRegistry {
    ActionRegistry::new()
        .register(actions::EVALUATE_OFFER, EvaluateOffer)
        .register(actions::EVALUATE_OFFER_AGAINST_HISTORY, EvaluateOfferAgainstHistory)
        .register(actions::VALIDATE_COUNTER_OFFER, ValidateCounterOffer)
        .register(actions::DRAFT_REPLY, DraftReply)
}

/// The negotiation policy in the context; defaults when none is present.
fn negotiation_policy(context: &ExecutionContext) -> Result<NegotiationPolicy, ActionError> {
    match context.policy() {
        Some(value) => Policy::new(value.clone())
            .negotiation()
            .map_err(|e| ActionError::InvalidInput(format!("policy: {e}"))),
        None => Ok(NegotiationPolicy::default()),
    }
}

fn amount_of(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.get("amount").and_then(Value::as_f64))
}

/// `baseline * (1 + pct%)`, to the cent.
fn raise_by_pct(baseline: f64, pct: f64) -> f64 {
    round_cents(baseline * (1.0 + pct / 100.0))
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
