//! Counterparty identity derived from an inbound email.
//!
//! The sender address identifies the counterparty when it is present
//! (`"Brand Team <Deals@Acme.com>"` becomes `deals@acme.com`). Without a
//! sender, the subject root is used, so replies and forwards of one
//! conversation (`"Re: Fwd: Spring campaign"`) land on `spring campaign`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

/// Key used when an email carries neither a sender nor a subject.
const UNKNOWN_COUNTERPARTY: &str = "unknown";

static REPLY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(re|fwd?|fw)\s*:\s*").expect("valid regex"));

static ANGLE_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\s*([^<>\s]+)\s*>").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterpartyKey(String);

impl CounterpartyKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derive the key from an email payload (`from`, then `subject`).
    pub fn from_email(email: &Value) -> Self {
        let field = |key: &str| {
            email
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        if let Some(from) = field("from") {
            return Self(normalize_address(from));
        }

        match field("subject").map(subject_root) {
            Some(root) if !root.is_empty() => Self(root),
            _ => Self(UNKNOWN_COUNTERPARTY.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CounterpartyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bare, lower-cased address from a `From` header value.
pub fn normalize_address(from: &str) -> String {
    ANGLE_ADDRESS
        .captures(from)
        .and_then(|caps| caps.get(1))
        .map_or(from, |m| m.as_str())
        .trim()
        .to_lowercase()
}

/// Subject with every leading reply/forward prefix removed, lower-cased and
/// with whitespace collapsed.
pub fn subject_root(subject: &str) -> String {
    let mut rest = subject;
    while let Some(m) = REPLY_PREFIX.find(rest) {
        rest = &rest[m.end()..];
    }
    rest.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
