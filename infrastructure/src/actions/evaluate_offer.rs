//! `evaluateOffer`: classify the current offer against the user's rates.

use super::{amount_of, negotiation_policy, raise_by_pct};
use async_trait::async_trait;
use dealflow_application::{ActionError, ActionHandler};
use dealflow_domain::{ExecutionContext, Step, keys, parse_amount};
use serde_json::{Value, json};

pub struct EvaluateOffer;

/// Where the evaluated offer came from.
struct FoundOffer {
    amount: f64,
    currency: Option<String>,
    source: &'static str,
}

fn find_offer(context: &ExecutionContext) -> Option<FoundOffer> {
    if let Some(value) = context.get(keys::OFFER)
        && let Some(amount) = amount_of(value)
    {
        return Some(FoundOffer {
            amount,
            currency: value
                .get("currency")
                .and_then(Value::as_str)
                .map(str::to_string),
            source: "context",
        });
    }

    if let Some(last) = context.thread_state().and_then(|state| state.last_offer) {
        return Some(FoundOffer {
            amount: last.amount,
            currency: last.currency,
            source: "thread",
        });
    }

    let email = context.email()?;
    ["body", "bodyText", "subject", "snippet"]
        .into_iter()
        .filter_map(|key| email.get(key).and_then(Value::as_str))
        .find_map(parse_amount)
        .map(|parsed| FoundOffer {
            amount: parsed.amount,
            currency: parsed.currency,
            source: "email",
        })
}

#[async_trait]
impl ActionHandler for EvaluateOffer {
    async fn run(&self, _step: &Step, context: &mut ExecutionContext) -> Result<Value, ActionError> {
        let policy = negotiation_policy(context)?;
        let offer = find_offer(context)
            .ok_or_else(|| ActionError::MissingInput("no offer in context, thread or email".to_string()))?;

        let risk_level = if offer.amount < policy.min_rate {
            "high"
        } else if offer.amount < policy.target_rate {
            "medium"
        } else {
            "low"
        };
        let recommended_counter = (offer.amount < policy.target_rate).then(|| {
            raise_by_pct(offer.amount, policy.negotiation_ceiling_pct).min(policy.target_rate)
        });

        let offer = json!({
            "amount": offer.amount,
            "currency": offer.currency,
            "source": offer.source,
        });
        let strategy = json!({
            "riskLevel": risk_level,
            "style": policy.negotiation_style,
            "recommendedCounter": recommended_counter,
        });
        context.insert(keys::OFFER, offer.clone());
        context.insert(keys::STRATEGY, strategy.clone());

        Ok(json!({ "offer": offer, "strategy": strategy }))
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

    fn context_with(values: Value) -> ExecutionContext {
        let Value::Object(map) = values else {
            panic!("object expected");
        };
        ExecutionContext::new(map, Policy::new(json!({ "minRate": 5000, "targetRate": 7500 })))
    }

    async fn run(context: &mut ExecutionContext) -> Result<Value, ActionError> {
        EvaluateOffer.run(&Step::new("evaluateOffer"), context).await
    }

    #[tokio::test]
    async fn test_risk_levels() {
        for (amount, risk) in [(4999.0, "high"), (5000.0, "medium"), (7500.0, "low")] {
            let mut context = context_with(json!({ "offer": amount }));
            let result = run(&mut context).await.unwrap();
            assert_eq!(result["strategy"]["riskLevel"], risk, "amount {amount}");
        }
    }

    #[tokio::test]
    async fn test_reads_email_and_writes_context() {
        let mut context = context_with(json!({
            "email": { "subject": "Campaign", "body": "Budget is €6,000 flat." }
        }));

        let result = run(&mut context).await.unwrap();

        assert_eq!(result["offer"]["source"], "email");
        assert_eq!(result["offer"]["currency"], "EUR");
        assert_eq!(context.get(keys::OFFER), Some(&result["offer"]));
        assert_eq!(context.get(keys::STRATEGY), Some(&result["strategy"]));
        assert_eq!(result["strategy"]["recommendedCounter"], json!(6900.0));
    }

    #[tokio::test]
    async fn test_thread_offer_wins_over_email() {
        let mut context = context_with(json!({ "email": { "body": "$9,000" } }));
        let thread = NegotiationThread::open("u1".into(), CounterpartyKey::new("x"));
        let offer = Offer {
            amount: 4000.0,
            currency: Some("USD".to_string()),
            direction: MessageDirection::Inbound,
            message_id: MessageId::new("m1"),
            observed_at: chrono::Utc::now(),
        };
        let state = ThreadState {
            last_offer: Some(offer.clone()),
            history: vec![offer],
        };
        context.attach_thread(&thread, &state).unwrap();

        let result = run(&mut context).await.unwrap();

        assert_eq!(result["offer"]["source"], "thread");
        assert_eq!(result["strategy"]["riskLevel"], "high");
    }

    #[tokio::test]
    async fn test_missing_offer_is_an_error() {
        let mut context = ExecutionContext::new(Map::new(), Policy::default());
        let err = run(&mut context).await.unwrap_err();
        assert!(matches!(err, ActionError::MissingInput(_)));
    }
}
