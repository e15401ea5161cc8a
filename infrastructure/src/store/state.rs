//! Store contents shared by the in-memory and file-backed stores.

use chrono::Utc;
use dealflow_application::{StoreError, TaskUpdate};
use dealflow_domain::{
    CounterpartyKey, NegotiationThread, NewThreadMessage, Task, TaskId, TaskStatus, ThreadId,
    ThreadMessage, ThreadStatus, UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every record a store holds.
///
/// Threads are unique per `(user_id, counterparty_key)` and messages get a
/// store-wide increasing sequence number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct StoreState {
    tasks: BTreeMap<TaskId, Task>,
    threads: Vec<NegotiationThread>,
    messages: Vec<ThreadMessage>,
    next_sequence: u64,
}

impl StoreState {
    pub fn insert_task(&mut self, task: &Task) -> Result<(), StoreError> {
        if self.tasks.contains_key(&task.id) {
            return Err(StoreError::Conflict(format!("task {}", task.id)));
        }
        self.tasks.insert(task.id.clone(), task.clone());
        Ok(())
    }

    pub fn get_task(&self, id: &TaskId) -> Option<Task> {
        self.tasks.get(id).cloned()
    }

    pub fn update_task(&mut self, id: &TaskId, update: TaskUpdate) -> Result<(), StoreError> {
        let task = self
            .tasks
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("task {id}")))?;
        match update {
            TaskUpdate::Running => task.status = TaskStatus::Running,
            TaskUpdate::Succeeded { output } => {
                task.status = TaskStatus::Success;
                task.output = Some(output);
            }
            TaskUpdate::Failed { error } => {
                task.status = TaskStatus::Error;
                task.error = Some(error);
            }
        }
        task.updated_at = Utc::now();
        Ok(())
    }

    pub fn find_thread(
        &self,
        user_id: &UserId,
        counterparty: &CounterpartyKey,
    ) -> Option<NegotiationThread> {
        self.threads
            .iter()
            .find(|t| &t.user_id == user_id && &t.counterparty_key == counterparty)
            .cloned()
    }

    pub fn get_thread(&self, id: &ThreadId) -> Option<NegotiationThread> {
        self.threads.iter().find(|t| &t.id == id).cloned()
    }

    pub fn create_thread(
        &mut self,
        user_id: &UserId,
        counterparty: &CounterpartyKey,
    ) -> Result<NegotiationThread, StoreError> {
        if self.find_thread(user_id, counterparty).is_some() {
            return Err(StoreError::Conflict(format!(
                "thread for {user_id} / {counterparty}"
            )));
        }
        let thread = NegotiationThread::open(user_id.clone(), counterparty.clone());
        self.threads.push(thread.clone());
        Ok(thread)
    }

    pub fn set_thread_status(
        &mut self,
        id: &ThreadId,
        status: ThreadStatus,
    ) -> Result<(), StoreError> {
        let thread = self
            .threads
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("thread {id}")))?;
        thread.status = status;
        thread.updated_at = Utc::now();
        Ok(())
    }

    pub fn append_message(&mut self, message: NewThreadMessage) -> Result<ThreadMessage, StoreError> {
        if self.get_thread(&message.thread_id).is_none() {
            return Err(StoreError::NotFound(format!("thread {}", message.thread_id)));
        }
        self.next_sequence += 1;
        let appended = ThreadMessage::appended(message, self.next_sequence);
        self.messages.push(appended.clone());
        Ok(appended)
    }

    pub fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<ThreadMessage>, StoreError> {
        if self.get_thread(thread_id).is_none() {
            return Err(StoreError::NotFound(format!("thread {thread_id}")));
        }
        Ok(self
            .messages
            .iter()
            .filter(|m| &m.thread_id == thread_id)
            .cloned()
            .collect())
    }
}
