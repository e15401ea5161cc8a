//! Thread and message entities

use super::counterparty::CounterpartyKey;
use crate::core::error::DomainError;
use crate::core::id::{MessageId, ThreadId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Snippets derived from a message body are cut to this many bytes.
const SNIPPET_MAX_BYTES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    #[default]
    Open,
    Closed,
}

impl ThreadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadStatus::Open => "open",
            ThreadStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ThreadStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(ThreadStatus::Open),
            "closed" => Ok(ThreadStatus::Closed),
            other => Err(DomainError::InvalidStatus(other.to_string())),
        }
    }
}

/// Persistent conversation record between a user and one counterparty.
///
/// At most one thread exists per `(user_id, counterparty_key)`; the thread
/// store enforces this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationThread {
    pub id: ThreadId,
    pub user_id: UserId,
    pub counterparty_key: CounterpartyKey,
    pub status: ThreadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NegotiationThread {
    /// A new open thread with a fresh id.
    pub fn open(user_id: UserId, counterparty_key: CounterpartyKey) -> Self {
        let now = Utc::now();
        Self {
            id: ThreadId::generate(),
            user_id,
            counterparty_key,
            status: ThreadStatus::Open,
            created_at: now,
            updated_at: now,
        }
    }

}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageDirection {
    Inbound,
    Outbound,
}

/// A message that has not been appended yet.
///
/// It carries no timestamp: the store stamps `created_at` when it appends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewThreadMessage {
    pub thread_id: ThreadId,
    pub direction: MessageDirection,
    pub subject: String,
    pub body: String,
    pub snippet: String,
    pub raw: Value,
}

impl NewThreadMessage {
    /// Build an inbound message from an email payload.
    ///
    /// Reads `subject`, `body` (falling back to `bodyText`) and `snippet`
    /// (falling back to the start of the body). The whole payload is kept
    /// as `raw`.
    pub fn inbound_from_email(thread_id: ThreadId, email: &Value) -> Self {
        let text = |key: &str| email.get(key).and_then(Value::as_str).map(str::to_string);

        let body = text("body").or_else(|| text("bodyText")).unwrap_or_default();
        let snippet = text("snippet").unwrap_or_else(|| snippet_of(&body).to_string());

        Self {
            thread_id,
            direction: MessageDirection::Inbound,
            subject: text("subject").unwrap_or_default(),
            body,
            snippet,
            raw: email.clone(),
        }
    }
}

/// An appended, immutable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadMessage {
    pub id: MessageId,
    pub thread_id: ThreadId,
    pub direction: MessageDirection,
    pub subject: String,
    pub body: String,
    pub snippet: String,
    pub raw: Value,
    /// Set by the store at append time
    pub created_at: DateTime<Utc>,
    /// Store-assigned append counter
    pub sequence: u64,
}

impl ThreadMessage {
    /// Materialize an appended message, stamped now, with its store-assigned
    /// sequence.
    pub fn appended(message: NewThreadMessage, sequence: u64) -> Self {
        Self {
            id: MessageId::generate(),
            thread_id: message.thread_id,
            direction: message.direction,
            subject: message.subject,
            body: message.body,
            snippet: message.snippet,
            raw: message.raw,
            created_at: Utc::now(),
            sequence,
        }
    }

    /// Append order. The sequence decides; the timestamp only separates
    /// messages whose sequences are equal.
    pub fn chronological(a: &ThreadMessage, b: &ThreadMessage) -> Ordering {
        a.sequence
            .cmp(&b.sequence)
            .then(a.created_at.cmp(&b.created_at))
    }
}

fn snippet_of(body: &str) -> &str {
    let trimmed = body.trim();
    if trimmed.len() <= SNIPPET_MAX_BYTES {
        return trimmed;
    }
    let mut end = SNIPPET_MAX_BYTES;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    &trimmed[..end]
}
