//! Negotiation Thread Store port
//!
//! Threads are unique per `(user, counterparty)`: [`ThreadStore::create_thread`]
//! must fail with [`StoreError::Conflict`] when the key is taken, including
//! when two callers race. Messages are append-only.

use super::StoreError;
use async_trait::async_trait;
use dealflow_domain::{
    CounterpartyKey, NegotiationThread, NewThreadMessage, ThreadId, ThreadMessage, ThreadStatus,
    UserId,
};

/// Port for thread and message persistence
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Find the thread for a `(user, counterparty)` pair
    async fn find_thread(
        &self,
        user_id: &UserId,
        counterparty: &CounterpartyKey,
    ) -> Result<Option<NegotiationThread>, StoreError>;

    /// Get a thread by id
    async fn get_thread(&self, id: &ThreadId) -> Result<Option<NegotiationThread>, StoreError>;

    /// Create an open thread; `Conflict` if one already exists for the pair
    async fn create_thread(
        &self,
        user_id: &UserId,
        counterparty: &CounterpartyKey,
    ) -> Result<NegotiationThread, StoreError>;

    /// Change a thread's status
    async fn set_thread_status(&self, id: &ThreadId, status: ThreadStatus) -> Result<(), StoreError>;

    /// Append a message; `NotFound` if the thread does not exist
    async fn append_message(&self, message: NewThreadMessage) -> Result<ThreadMessage, StoreError>;

    /// All messages of a thread in append order; `NotFound` for an unknown thread
    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<ThreadMessage>, StoreError>;
}
