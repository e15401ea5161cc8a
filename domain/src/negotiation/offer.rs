//! Offer extraction from message text.
//!
//! Amounts may carry a leading currency symbol (`$ € £`) or a trailing
//! currency code/word. An amount with a currency marker is preferred; when a
//! message has none, the first bare amount of at least [`MIN_BARE_AMOUNT`] is
//! used so that counts like "3 reels" are not mistaken for prices. Amounts
//! below [`MIN_AMOUNT`] are noise, marked or not.

use super::entities::{MessageDirection, ThreadMessage};
use crate::core::id::MessageId;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Smallest amount that counts as a price at all.
pub const MIN_AMOUNT: f64 = 1.0;

/// Smallest unmarked number that is treated as a price.
pub const MIN_BARE_AMOUNT: f64 = 100.0;

static PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?P<symbol>[$€£])?\s*(?P<amount>\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?|\d+(?:\.\d{1,2})?)(?:\s*(?P<code>usd|eur|gbp|aed|sar|sek|nok|dollars|pounds|euros|euro)\b)?",
    )
    .expect("valid regex")
});

/// Currency aliases, checked in order.
const CURRENCY_ALIASES: &[(&str, &str)] = &[
    ("£", "GBP"),
    ("gbp", "GBP"),
    ("pounds", "GBP"),
    ("pound", "GBP"),
    ("$", "USD"),
    ("usd", "USD"),
    ("dollars", "USD"),
    ("€", "EUR"),
    ("eur", "EUR"),
    ("euros", "EUR"),
    ("euro", "EUR"),
    ("aed", "AED"),
    ("sar", "SAR"),
    ("sek", "SEK"),
    ("nok", "NOK"),
];

/// Map a symbol, code or currency word to an ISO code.
///
/// Unknown three-letter inputs are passed through upper-cased.
pub fn normalise_currency(input: &str) -> Option<String> {
    let lower = input.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    if let Some((_, code)) = CURRENCY_ALIASES.iter().find(|(alias, _)| *alias == lower) {
        return Some((*code).to_string());
    }
    if let Some((_, code)) = CURRENCY_ALIASES.iter().find(|(alias, _)| lower.contains(alias)) {
        return Some((*code).to_string());
    }
    let letters: String = lower.chars().filter(char::is_ascii_alphabetic).collect();
    (letters.len() == 3).then(|| letters.to_uppercase())
}

/// An amount found in free text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAmount {
    pub amount: f64,
    pub currency: Option<String>,
}

/// Find the most plausible price in a piece of text.
pub fn parse_amount(text: &str) -> Option<ParsedAmount> {
    let mut bare: Option<ParsedAmount> = None;

    for caps in PRICE.captures_iter(text) {
        let Some(amount) = caps
            .name("amount")
            .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        else {
            continue;
        };
        if amount < MIN_AMOUNT {
            continue;
        }

        let marker = caps.name("symbol").or_else(|| caps.name("code"));
        match marker {
            Some(marker) => {
                return Some(ParsedAmount {
                    amount,
                    currency: normalise_currency(marker.as_str()),
                });
            }
            None if bare.is_none() && amount >= MIN_BARE_AMOUNT => {
                bare = Some(ParsedAmount {
                    amount,
                    currency: None,
                });
            }
            None => {}
        }
    }

    bare
}

/// An offer identified in a thread message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub amount: f64,
    pub currency: Option<String>,
    pub direction: MessageDirection,
    pub message_id: MessageId,
    pub observed_at: DateTime<Utc>,
}

impl Offer {
    /// Extract an offer from a message, looking at the body, then the
    /// subject, then the snippet.
    pub fn from_message(message: &ThreadMessage) -> Option<Self> {
        [&message.body, &message.subject, &message.snippet]
            .into_iter()
            .find_map(|text| parse_amount(text))
            .map(|parsed| Self {
                amount: parsed.amount,
                currency: parsed.currency,
                direction: message.direction,
                message_id: message.id.clone(),
                observed_at: message.created_at,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_amount() {
        let parsed = parse_amount("We can offer £1,250.50 for the campaign").unwrap();
        assert_eq!(parsed.amount, 1250.5);
        assert_eq!(parsed.currency.as_deref(), Some("GBP"));
    }

    #[test]
    fn test_trailing_code() {
        let parsed = parse_amount("Budget is 4000 usd all-in").unwrap();
        assert_eq!(parsed.amount, 4000.0);
        assert_eq!(parsed.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_unseparated_thousands_are_not_split() {
        let parsed = parse_amount("Our offer: $5000").unwrap();
        assert_eq!(parsed.amount, 5000.0);
    }

    #[test]
    fn test_marked_amount_beats_earlier_count() {
        let parsed = parse_amount("3 reels and 2 stories for €900").unwrap();
        assert_eq!(parsed.amount, 900.0);
        assert_eq!(parsed.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_bare_amount_needs_minimum() {
        assert!(parse_amount("We'd like 3 reels").is_none());
        let parsed = parse_amount("We'd like 3 reels, budget 500").unwrap();
        assert_eq!(parsed.amount, 500.0);
        assert_eq!(parsed.currency, None);
    }

    #[test]
    fn test_sub_unit_amounts_are_ignored() {
        assert!(parse_amount("Budget: $0").is_none());
        assert!(parse_amount("Only £0.50 per view").is_none());

        let parsed = parse_amount("Not $0, we mean $1,200").unwrap();
        assert_eq!(parsed.amount, 1200.0);
        assert_eq!(parsed.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_normalise_currency() {
        assert_eq!(normalise_currency("£").as_deref(), Some("GBP"));
        assert_eq!(normalise_currency("Euros").as_deref(), Some("EUR"));
        assert_eq!(normalise_currency("chf").as_deref(), Some("CHF"));
        assert_eq!(normalise_currency("  "), None);
        assert_eq!(normalise_currency("bitcoin"), None);
    }
}
