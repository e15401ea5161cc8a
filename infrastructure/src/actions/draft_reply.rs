//! `draftReply`: prepare the reply to the counterparty.

use super::{amount_of, negotiation_policy};
use async_trait::async_trait;
use dealflow_application::{ActionError, ActionHandler};
use dealflow_domain::{ExecutionContext, Step, keys};
use serde_json::{Value, json};

pub struct DraftReply;

fn reply_subject(email: Option<&Value>) -> String {
    let subject = email
        .and_then(|e| e.get("subject"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty());
    match subject {
        Some(s) if s.to_lowercase().starts_with("re:") => s.to_string(),
        Some(s) => format!("Re: {s}"),
        None => "Re: Your offer".to_string(),
    }
}

fn format_money(amount: f64, currency: Option<&str>) -> String {
    let number = if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    };
    match currency {
        Some(code) => format!("{code} {number}"),
        None => number,
    }
}

fn opening(style: &str) -> &'static str {
    match style {
        "assertive" => "Thanks for the offer.",
        "flexible" => "Thank you so much for the offer, we'd love to make this work.",
        _ => "Thanks for the offer, we're excited about the collaboration.",
    }
}

#[async_trait]
impl ActionHandler for DraftReply {
    async fn run(&self, _step: &Step, context: &mut ExecutionContext) -> Result<Value, ActionError> {
        let policy = negotiation_policy(context)?;
        let offer = context.get(keys::OFFER);
        let currency = offer
            .and_then(|o| o.get("currency"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let offer_amount = offer.and_then(amount_of);
        let counter = context.get(keys::COUNTER_OFFER).and_then(amount_of);

        let body = match (counter, offer_amount) {
            (Some(counter), _) => format!(
                "{} Given the scope and deliverables, our rate for this would be {}. Happy to talk through the details.",
                opening(&policy.negotiation_style),
                format_money(counter, currency.as_deref()),
            ),
            (None, Some(amount)) => format!(
                "{} {} works for us. Please send over the brief and contract and we'll get started.",
                opening(&policy.negotiation_style),
                format_money(amount, currency.as_deref()),
            ),
            (None, None) => "Thanks for reaching out! Could you share the budget and deliverables you have in mind?".to_string(),
        };

        let draft = json!({
            "subject": reply_subject(context.email()),
            "body": body,
            "autoSend": policy.auto_send(),
        });
        context.insert(keys::DRAFT, draft.clone());

        Ok(draft)
    }
}
