//! `validateCounterOffer`: check a proposed counter against the ceiling.

use super::{amount_of, negotiation_policy, raise_by_pct};
use async_trait::async_trait;
use dealflow_application::{ActionError, ActionHandler};
use dealflow_domain::{ExecutionContext, Step, keys};
use serde_json::{Value, json};

/// Approves a counter when it is at most `negotiationCeilingPct` above the
/// offer on the table.
///
/// The counter comes from the step's `amount` parameter, else from
/// `context.counterOffer`. The baseline is `context.offer`, else the
/// thread's last offer.
pub struct ValidateCounterOffer;

#[async_trait]
impl ActionHandler for ValidateCounterOffer {
    async fn run(&self, step: &Step, context: &mut ExecutionContext) -> Result<Value, ActionError> {
        let policy = negotiation_policy(context)?;

        let counter = step
            .param("amount")
            .or_else(|| context.get(keys::COUNTER_OFFER))
            .map(|value| {
                amount_of(value).ok_or_else(|| {
                    ActionError::InvalidInput(format!("counter offer is not an amount: {value}"))
                })
            })
            .transpose()?
            .ok_or_else(|| ActionError::MissingInput(keys::COUNTER_OFFER.to_string()))?;

        let baseline = context
            .get(keys::OFFER)
            .and_then(amount_of)
            .or_else(|| {
                context
                    .thread_state()
                    .and_then(|state| state.last_offer)
                    .map(|offer| offer.amount)
            })
            .ok_or_else(|| ActionError::MissingInput(keys::OFFER.to_string()))?;

        let ceiling = raise_by_pct(baseline, policy.negotiation_ceiling_pct);

        Ok(json!({
            "approved": counter <= ceiling,
            "counterOffer": counter,
            "baseline": baseline,
            "ceiling": ceiling,
        }))
    }
}
