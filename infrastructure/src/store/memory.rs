//! In-memory task and thread store.

use super::state::StoreState;
use async_trait::async_trait;
use dealflow_application::{StoreError, TaskStore, TaskUpdate, ThreadStore};
use dealflow_domain::{
    CounterpartyKey, NegotiationThread, NewThreadMessage, Task, TaskId, ThreadId, ThreadMessage,
    ThreadStatus, UserId,
};
use tokio::sync::Mutex;

/// Process-local store; contents are lost on exit.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn insert(&self, task: &Task) -> Result<(), StoreError> {
        self.state.lock().await.insert_task(task)
    }

    async fn get(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.state.lock().await.get_task(id))
    }

    async fn update(&self, id: &TaskId, update: TaskUpdate) -> Result<(), StoreError> {
        self.state.lock().await.update_task(id, update)
    }
}

#[async_trait]
impl ThreadStore for InMemoryStore {
    async fn find_thread(
        &self,
        user_id: &UserId,
        counterparty: &CounterpartyKey,
    ) -> Result<Option<NegotiationThread>, StoreError> {
        Ok(self.state.lock().await.find_thread(user_id, counterparty))
    }

    async fn get_thread(&self, id: &ThreadId) -> Result<Option<NegotiationThread>, StoreError> {
        Ok(self.state.lock().await.get_thread(id))
    }

    async fn create_thread(
        &self,
        user_id: &UserId,
        counterparty: &CounterpartyKey,
    ) -> Result<NegotiationThread, StoreError> {
        self.state.lock().await.create_thread(user_id, counterparty)
    }

    async fn set_thread_status(&self, id: &ThreadId, status: ThreadStatus) -> Result<(), StoreError> {
        self.state.lock().await.set_thread_status(id, status)
    }

    async fn append_message(&self, message: NewThreadMessage) -> Result<ThreadMessage, StoreError> {
        self.state.lock().await.append_message(message)
    }

    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<ThreadMessage>, StoreError> {
        self.state.lock().await.list_messages(thread_id)
    }
}
