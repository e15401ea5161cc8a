//! Negotiation thread use cases.
//!
//! Built on [`ThreadStore`]: find-or-create a thread for a counterparty,
//! append messages, and derive the active [`ThreadState`] from the log.

use crate::ports::StoreError;
use crate::ports::thread_store::ThreadStore;
use dealflow_domain::{
    CounterpartyKey, NegotiationThread, NewThreadMessage, ThreadId, ThreadMessage, ThreadState,
    ThreadStatus, UserId,
};
use std::sync::Arc;
use tracing::{debug, info};

pub struct NegotiationThreadService<S: ThreadStore> {
    store: Arc<S>,
}

impl<S: ThreadStore> Clone for NegotiationThreadService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ThreadStore> NegotiationThreadService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Return the thread for `(user_id, counterparty)`, creating it if absent.
    ///
    /// Concurrent callers converge on one thread: the store rejects the
    /// second creation with a conflict and the loser re-reads the winner.
    pub async fn find_or_create_thread(
        &self,
        user_id: &UserId,
        counterparty: &CounterpartyKey,
    ) -> Result<NegotiationThread, StoreError> {
        if let Some(thread) = self.store.find_thread(user_id, counterparty).await? {
            debug!(thread_id = %thread.id, counterparty = %counterparty, "Found negotiation thread");
            return Ok(thread);
        }

        match self.store.create_thread(user_id, counterparty).await {
            Ok(thread) => {
                info!(thread_id = %thread.id, user_id = %user_id, counterparty = %counterparty, "Opened negotiation thread");
                Ok(thread)
            }
            Err(e) if e.is_conflict() => {
                debug!(counterparty = %counterparty, "Thread created concurrently, re-reading");
                self.store
                    .find_thread(user_id, counterparty)
                    .await?
                    .ok_or_else(|| {
                        StoreError::NotFound(format!(
                            "thread for {} / {} after conflict",
                            user_id, counterparty
                        ))
                    })
            }
            Err(e) => Err(e),
        }
    }

    /// Append a message to its thread. Duplicate content is accepted.
    pub async fn record_thread_message(
        &self,
        message: NewThreadMessage,
    ) -> Result<ThreadMessage, StoreError> {
        let appended = self.store.append_message(message).await?;
        debug!(
            thread_id = %appended.thread_id,
            sequence = appended.sequence,
            "Recorded thread message"
        );
        Ok(appended)
    }

    /// Derive the thread's current offer state from its full message log.
    ///
    /// Always reads the store; nothing is cached between calls.
    pub async fn get_active_thread_state(
        &self,
        thread_id: &ThreadId,
    ) -> Result<ThreadState, StoreError> {
        let messages = self.store.list_messages(thread_id).await?;
        Ok(ThreadState::from_messages(&messages))
    }

    /// Mark a thread closed.
    pub async fn close_thread(&self, thread_id: &ThreadId) -> Result<(), StoreError> {
        self.store
            .set_thread_status(thread_id, ThreadStatus::Closed)
            .await?;
        info!(thread_id = %thread_id, "Closed negotiation thread");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::MockThreadStore;
    use serde_json::json;

    fn service(store: &Arc<MockThreadStore>) -> NegotiationThreadService<MockThreadStore> {
        NegotiationThreadService::new(Arc::clone(store))
    }

    #[tokio::test]
    async fn test_find_or_create_is_idempotent() {
        let store = Arc::new(MockThreadStore::new());
        let threads = service(&store);
        let user = UserId::new("u1");
        let key = CounterpartyKey::new("deals@acme.com");

        let first = threads.find_or_create_thread(&user, &key).await.unwrap();
        let second = threads.find_or_create_thread(&user, &key).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.thread_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_creation_converges() {
        let store = Arc::new(MockThreadStore::new().with_race_on_first_lookups(2));
        let threads = service(&store);
        let user = UserId::new("u1");
        let key = CounterpartyKey::new("deals@acme.com");

        let (a, b) = futures::join!(
            threads.find_or_create_thread(&user, &key),
            threads.find_or_create_thread(&user, &key),
        );

        assert_eq!(a.unwrap().id, b.unwrap().id);
        assert_eq!(store.thread_count(), 1);
        assert_eq!(store.conflict_count(), 1);
    }

    #[tokio::test]
    async fn test_distinct_counterparties_get_distinct_threads() {
        let store = Arc::new(MockThreadStore::new());
        let threads = service(&store);
        let user = UserId::new("u1");

        let a = threads
            .find_or_create_thread(&user, &CounterpartyKey::new("a@brand.com"))
            .await
            .unwrap();
        let b = threads
            .find_or_create_thread(&user, &CounterpartyKey::new("b@brand.com"))
            .await
            .unwrap();
        let other_user = threads
            .find_or_create_thread(&UserId::new("u2"), &CounterpartyKey::new("a@brand.com"))
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
        assert_ne!(a.id, other_user.id);
    }

    #[tokio::test]
    async fn test_state_reflects_latest_append() {
        let store = Arc::new(MockThreadStore::new());
        let threads = service(&store);
        let thread = threads
            .find_or_create_thread(&UserId::new("u1"), &CounterpartyKey::new("offer"))
            .await
            .unwrap();

        let state = threads.get_active_thread_state(&thread.id).await.unwrap();
        assert!(state.last_offer.is_none());

        threads
            .record_thread_message(NewThreadMessage::inbound_from_email(
                thread.id.clone(),
                &json!({ "body": "We can offer £500" }),
            ))
            .await
            .unwrap();
        let state = threads.get_active_thread_state(&thread.id).await.unwrap();
        assert_eq!(state.last_offer.unwrap().amount, 500.0);

        threads
            .record_thread_message(NewThreadMessage::inbound_from_email(
                thread.id.clone(),
                &json!({ "body": "Final offer: £650" }),
            ))
            .await
            .unwrap();
        let state = threads.get_active_thread_state(&thread.id).await.unwrap();
        assert_eq!(state.last_offer.unwrap().amount, 650.0);
        assert_eq!(state.history.len(), 2);
    }

    #[tokio::test]
    async fn test_state_follows_append_order_not_build_order() {
        let store = Arc::new(MockThreadStore::new());
        let threads = service(&store);
        let thread = threads
            .find_or_create_thread(&UserId::new("u1"), &CounterpartyKey::new("offer"))
            .await
            .unwrap();

        let early = NewThreadMessage::inbound_from_email(
            thread.id.clone(),
            &json!({ "body": "We can stretch to $900" }),
        );
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let late = NewThreadMessage::inbound_from_email(
            thread.id.clone(),
            &json!({ "body": "Our budget is $500" }),
        );

        threads.record_thread_message(late).await.unwrap();
        threads.record_thread_message(early).await.unwrap();

        let state = threads.get_active_thread_state(&thread.id).await.unwrap();
        assert_eq!(state.last_offer.unwrap().amount, 900.0);
    }

    #[tokio::test]
    async fn test_duplicate_messages_are_kept() {
        let store = Arc::new(MockThreadStore::new());
        let threads = service(&store);
        let thread = threads
            .find_or_create_thread(&UserId::new("u1"), &CounterpartyKey::new("offer"))
            .await
            .unwrap();
        let email = json!({ "subject": "Re: Offer", "body": "same" });

        let first = threads
            .record_thread_message(NewThreadMessage::inbound_from_email(thread.id.clone(), &email))
            .await
            .unwrap();
        let second = threads
            .record_thread_message(NewThreadMessage::inbound_from_email(thread.id.clone(), &email))
            .await
            .unwrap();

        assert!(second.sequence > first.sequence);
        assert_eq!(store.messages_for(&thread.id).len(), 2);
    }

    #[tokio::test]
    async fn test_close_thread() {
        let store = Arc::new(MockThreadStore::new());
        let threads = service(&store);
        let thread = threads
            .find_or_create_thread(&UserId::new("u1"), &CounterpartyKey::new("offer"))
            .await
            .unwrap();

        threads.close_thread(&thread.id).await.unwrap();
        assert_eq!(store.thread_status(&thread.id), Some(ThreadStatus::Closed));

        let missing = threads.close_thread(&ThreadId::new("nope")).await;
        assert!(matches!(missing, Err(StoreError::NotFound(_))));
    }
}
