//! `evaluateOfferAgainstHistory`: decide whether the latest offer is worth
//! countering, given the offers seen so far on the thread.

use super::{negotiation_policy, raise_by_pct};
use async_trait::async_trait;
use dealflow_application::{ActionError, ActionHandler};
use dealflow_domain::{ExecutionContext, Step, keys};
use serde_json::{Value, json};
use std::cmp::Ordering;

pub struct EvaluateOfferAgainstHistory;

#[async_trait]
impl ActionHandler for EvaluateOfferAgainstHistory {
    async fn run(&self, _step: &Step, context: &mut ExecutionContext) -> Result<Value, ActionError> {
        let policy = negotiation_policy(context)?;
        let state = context
            .thread_state()
            .ok_or_else(|| ActionError::MissingInput(keys::THREAD_STATE.to_string()))?;
        let last = state
            .last_offer
            .as_ref()
            .ok_or_else(|| ActionError::MissingInput("threadState.lastOffer".to_string()))?;
        let previous = state.previous_offer().map(|offer| offer.amount);

        let trend = match previous.map(|p| last.amount.partial_cmp(&p)) {
            None => "first",
            Some(Some(Ordering::Greater)) => "up",
            Some(Some(Ordering::Less)) => "down",
            Some(_) => "flat",
        };
        let should_counter = last.amount < policy.target_rate;
        let suggested_counter = should_counter.then(|| {
            raise_by_pct(last.amount, policy.negotiation_ceiling_pct).min(policy.target_rate)
        });

        let assessment = json!({
            "lastOffer": last.amount,
            "currency": last.currency,
            "previousOffer": previous,
            "trend": trend,
            "offersSeen": state.history.len(),
            "shouldCounter": should_counter,
            "suggestedCounter": suggested_counter,
        });
        context.insert(keys::HISTORY_ASSESSMENT, assessment.clone());
        if let Some(counter) = suggested_counter {
            context.insert(keys::COUNTER_OFFER, json!(counter));
        }

        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealflow_domain::{
        CounterpartyKey, MessageDirection, MessageId, NegotiationThread, Offer, Policy,
        ThreadState,
    };
    use serde_json::Map;

    fn offer(amount: f64) -> Offer {
        Offer {
            amount,
            currency: Some("USD".to_string()),
            direction: MessageDirection::Inbound,
            message_id: MessageId::generate(),
            observed_at: chrono::Utc::now(),
        }
    }

    /// Context whose thread history is `amounts`, newest first.
    fn context_with_history(amounts: &[f64]) -> ExecutionContext {
        let mut context = ExecutionContext::new(
            Map::new(),
            Policy::new(json!({ "targetRate": 7500, "negotiationCeilingPct": 10 })),
        );
        let history: Vec<Offer> = amounts.iter().copied().map(offer).collect();
        let state = ThreadState {
            last_offer: history.first().cloned(),
            history,
        };
        let thread = NegotiationThread::open("u1".into(), CounterpartyKey::new("x"));
        context.attach_thread(&thread, &state).unwrap();
        context
    }

    async fn run(context: &mut ExecutionContext) -> Value {
        EvaluateOfferAgainstHistory
            .run(&Step::new("evaluateOfferAgainstHistory"), context)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_counter_below_target() {
        let mut context = context_with_history(&[6000.0, 5000.0]);

        let result = run(&mut context).await;

        assert_eq!(result["shouldCounter"], true);
        assert_eq!(result["trend"], "up");
        assert_eq!(result["suggestedCounter"], json!(6600.0));
        assert_eq!(context.get(keys::COUNTER_OFFER), Some(&json!(6600.0)));
        assert_eq!(context.get(keys::HISTORY_ASSESSMENT), Some(&result));
    }

    #[tokio::test]
    async fn test_suggestion_is_capped_at_target() {
        let mut context = context_with_history(&[7000.0]);

        let result = run(&mut context).await;

        assert_eq!(result["trend"], "first");
        assert_eq!(result["suggestedCounter"], json!(7500.0));
    }

    #[tokio::test]
    async fn test_no_counter_at_target() {
        let mut context = context_with_history(&[7500.0, 8000.0]);

        let result = run(&mut context).await;

        assert_eq!(result["shouldCounter"], false);
        assert_eq!(result["trend"], "down");
        assert!(result["suggestedCounter"].is_null());
        assert!(!context.contains(keys::COUNTER_OFFER));
    }

    #[tokio::test]
    async fn test_requires_thread_state() {
        let mut context = ExecutionContext::new(Map::new(), Policy::default());
        let err = EvaluateOfferAgainstHistory
            .run(&Step::new("evaluateOfferAgainstHistory"), &mut context)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::MissingInput(_)));
    }
}
