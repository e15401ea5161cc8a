//! Execution context.
//!
//! One mutable JSON object per task execution. Every action receives it by
//! mutable reference and it is the only way one step sees what an earlier
//! step did. It is never shared between executions.
//!
//! # Keys
//!
//! | Key | Written by | Read by |
//! |-----|-----------|---------|
//! | task context keys | task creator | any action |
//! | [`keys::EMAIL`] | task creator | engine (thread attachment), `evaluateOffer`, `draftReply` |
//! | [`keys::POLICY`] | engine | every negotiation action |
//! | [`keys::THREAD`] | engine | engine (thread close) |
//! | [`keys::THREAD_STATE`] | engine | `evaluateOffer`, `evaluateOfferAgainstHistory`, `validateCounterOffer` |
//! | [`keys::OFFER`] | task creator or `evaluateOffer` | `validateCounterOffer`, `draftReply` |
//! | [`keys::STRATEGY`] | `evaluateOffer` | `draftReply` |
//! | [`keys::HISTORY_ASSESSMENT`] | `evaluateOfferAgainstHistory` | `draftReply` |
//! | [`keys::COUNTER_OFFER`] | `evaluateOfferAgainstHistory` | `validateCounterOffer`, `draftReply` |
//! | [`keys::DRAFT`] | `draftReply` | callers inspecting the result |

use crate::core::error::DomainError;
use crate::core::id::ThreadId;
use crate::negotiation::entities::NegotiationThread;
use crate::negotiation::state::ThreadState;
use crate::policy::Policy;
use serde::Serialize;
use serde_json::{Map, Value};

pub mod keys {
    pub const EMAIL: &str = "email";
    pub const POLICY: &str = "policy";
    pub const THREAD: &str = "thread";
    pub const THREAD_STATE: &str = "threadState";
    pub const OFFER: &str = "offer";
    pub const STRATEGY: &str = "strategy";
    pub const HISTORY_ASSESSMENT: &str = "historyAssessment";
    pub const COUNTER_OFFER: &str = "counterOffer";
    pub const DRAFT: &str = "draft";
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionContext {
    values: Map<String, Value>,
}

impl ExecutionContext {
    /// Merge the task's starting context with the loaded policy.
    ///
    /// The policy always replaces a `policy` key from the task context.
    pub fn new(task_context: Map<String, Value>, policy: Policy) -> Self {
        let mut values = task_context;
        values.insert(keys::POLICY.to_string(), policy.into_value());
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(key.into(), value)
    }

    /// Serialize `value` and store it under `key`.
    pub fn put<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> Result<(), DomainError> {
        let value = serde_json::to_value(value)?;
        self.values.insert(key.into(), value);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Inbound email payload, if present and not `null`.
    pub fn email(&self) -> Option<&Value> {
        self.values.get(keys::EMAIL).filter(|v| !v.is_null())
    }

    pub fn policy(&self) -> Option<&Value> {
        self.values.get(keys::POLICY)
    }

    /// Attach the negotiation thread and its derived state.
    pub fn attach_thread(
        &mut self,
        thread: &NegotiationThread,
        state: &ThreadState,
    ) -> Result<(), DomainError> {
        self.put(keys::THREAD, thread)?;
        self.put(keys::THREAD_STATE, state)
    }

    /// Id of the attached thread, read back from `thread.id`.
    pub fn thread_id(&self) -> Option<ThreadId> {
        self.values
            .get(keys::THREAD)
            .and_then(|thread| thread.get("id"))
            .and_then(Value::as_str)
            .map(ThreadId::new)
    }

    /// Attached thread state, if present and well-formed.
    pub fn thread_state(&self) -> Option<ThreadState> {
        self.values
            .get(keys::THREAD_STATE)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}
