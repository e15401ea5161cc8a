//! In-memory port doubles shared by the use case tests.

use crate::ports::StoreError;
use crate::ports::action_handler::{ActionError, ActionHandler};
use crate::ports::policy_supplier::{PolicyError, PolicySupplier};
use crate::ports::task_store::{TaskStore, TaskUpdate};
use crate::ports::thread_store::ThreadStore;
use async_trait::async_trait;
use dealflow_domain::{
    CounterpartyKey, ExecutionContext, NegotiationThread, NewThreadMessage, Policy, Step, Task,
    TaskId, TaskStatus, ThreadId, ThreadMessage, ThreadStatus, UserId, keys,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

// ==================== Task store ====================

#[derive(Default)]
pub struct MockTaskStore {
    tasks: Mutex<HashMap<TaskId, Task>>,
    writes: Mutex<Vec<(TaskId, TaskUpdate)>>,
    fail_success_writes: bool,
}

impl MockTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task(self, task: Task) -> Self {
        self.tasks.lock().unwrap().insert(task.id.clone(), task);
        self
    }

    /// Make every `Succeeded` write fail with an I/O error.
    pub fn failing_success_writes(mut self) -> Self {
        self.fail_success_writes = true;
        self
    }

    pub fn writes(&self) -> Vec<TaskUpdate> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .map(|(_, update)| update.clone())
            .collect()
    }

    pub fn task(&self, id: &TaskId) -> Option<Task> {
        self.tasks.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl TaskStore for MockTaskStore {
    async fn insert(&self, task: &Task) -> Result<(), StoreError> {
        self.tasks.lock().unwrap().insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn get(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.tasks.lock().unwrap().get(id).cloned())
    }

    async fn update(&self, id: &TaskId, update: TaskUpdate) -> Result<(), StoreError> {
        if self.fail_success_writes && matches!(update, TaskUpdate::Succeeded { .. }) {
            return Err(StoreError::Io("disk full".to_string()));
        }
        self.writes.lock().unwrap().push((id.clone(), update.clone()));

        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
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
        Ok(())
    }
}

// ==================== Thread store ====================

#[derive(Default)]
struct ThreadTables {
    threads: Vec<NegotiationThread>,
    messages: Vec<ThreadMessage>,
    next_sequence: u64,
}

#[derive(Default)]
pub struct MockThreadStore {
    tables: Mutex<ThreadTables>,
    race: Option<(Barrier, usize)>,
    lookups: AtomicUsize,
    conflicts: AtomicUsize,
}

impl MockThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold the first `n` lookups until all of them have read the table, so
    /// that every one of them sees "no thread" and goes on to create one.
    pub fn with_race_on_first_lookups(mut self, n: usize) -> Self {
        self.race = Some((Barrier::new(n), n));
        self
    }

    pub fn seed_thread(&self, user_id: &str, counterparty: &str) -> NegotiationThread {
        let thread = NegotiationThread::open(UserId::new(user_id), CounterpartyKey::new(counterparty));
        self.tables.lock().unwrap().threads.push(thread.clone());
        thread
    }

    pub fn seed_message(&self, thread_id: &ThreadId, body: &str) {
        let mut tables = self.tables.lock().unwrap();
        tables.next_sequence += 1;
        let sequence = tables.next_sequence;
        let message = NewThreadMessage::inbound_from_email(thread_id.clone(), &json!({ "body": body }));
        tables.messages.push(ThreadMessage::appended(message, sequence));
    }

    pub fn thread_count(&self) -> usize {
        self.tables.lock().unwrap().threads.len()
    }

    pub fn conflict_count(&self) -> usize {
        self.conflicts.load(Ordering::SeqCst)
    }

    pub fn messages_for(&self, thread_id: &ThreadId) -> Vec<ThreadMessage> {
        self.tables
            .lock()
            .unwrap()
            .messages
            .iter()
            .filter(|m| &m.thread_id == thread_id)
            .cloned()
            .collect()
    }

    pub fn thread_status(&self, thread_id: &ThreadId) -> Option<ThreadStatus> {
        self.tables
            .lock()
            .unwrap()
            .threads
            .iter()
            .find(|t| &t.id == thread_id)
            .map(|t| t.status)
    }
}

#[async_trait]
impl ThreadStore for MockThreadStore {
    async fn find_thread(
        &self,
        user_id: &UserId,
        counterparty: &CounterpartyKey,
    ) -> Result<Option<NegotiationThread>, StoreError> {
        let found = {
            let tables = self.tables.lock().unwrap();
            tables
                .threads
                .iter()
                .find(|t| &t.user_id == user_id && &t.counterparty_key == counterparty)
                .cloned()
        };
        if let Some((barrier, n)) = &self.race
            && self.lookups.fetch_add(1, Ordering::SeqCst) < *n
        {
            barrier.wait().await;
        }
        Ok(found)
    }

    async fn get_thread(&self, id: &ThreadId) -> Result<Option<NegotiationThread>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.threads.iter().find(|t| &t.id == id).cloned())
    }

    async fn create_thread(
        &self,
        user_id: &UserId,
        counterparty: &CounterpartyKey,
    ) -> Result<NegotiationThread, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .threads
            .iter()
            .any(|t| &t.user_id == user_id && &t.counterparty_key == counterparty)
        {
            self.conflicts.fetch_add(1, Ordering::SeqCst);
            return Err(StoreError::Conflict(counterparty.to_string()));
        }
        let thread = NegotiationThread::open(user_id.clone(), counterparty.clone());
        tables.threads.push(thread.clone());
        Ok(thread)
    }

    async fn set_thread_status(&self, id: &ThreadId, status: ThreadStatus) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let thread = tables
            .threads
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        thread.status = status;
        Ok(())
    }

    async fn append_message(&self, message: NewThreadMessage) -> Result<ThreadMessage, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.threads.iter().any(|t| t.id == message.thread_id) {
            return Err(StoreError::NotFound(message.thread_id.to_string()));
        }
        tables.next_sequence += 1;
        let appended = ThreadMessage::appended(message, tables.next_sequence);
        tables.messages.push(appended.clone());
        Ok(appended)
    }

    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<ThreadMessage>, StoreError> {
        let tables = self.tables.lock().unwrap();
        if !tables.threads.iter().any(|t| &t.id == thread_id) {
            return Err(StoreError::NotFound(thread_id.to_string()));
        }
        Ok(tables
            .messages
            .iter()
            .filter(|m| &m.thread_id == thread_id)
            .cloned()
            .collect())
    }
}

// ==================== Policy ====================

pub struct StaticPolicy(pub Value);

#[async_trait]
impl PolicySupplier for StaticPolicy {
    async fn load(&self, _user_id: Option<&UserId>) -> Result<Policy, PolicyError> {
        Ok(Policy::new(self.0.clone()))
    }
}

pub struct UnavailablePolicy;

#[async_trait]
impl PolicySupplier for UnavailablePolicy {
    async fn load(&self, user_id: Option<&UserId>) -> Result<Policy, PolicyError> {
        Err(PolicyError::Unavailable {
            user: user_id.map(ToString::to_string).unwrap_or_default(),
            reason: "policy service down".to_string(),
        })
    }
}

// ==================== Actions ====================

/// Returns a fixed result and counts its calls.
pub struct Returns {
    result: Value,
    calls: Arc<AtomicUsize>,
}

impl Returns {
    pub fn new(result: Value) -> Self {
        Self {
            result,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ActionHandler for Returns {
    async fn run(&self, _step: &Step, _context: &mut ExecutionContext) -> Result<Value, ActionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.clone())
    }
}

pub struct Fails(pub &'static str);

#[async_trait]
impl ActionHandler for Fails {
    async fn run(&self, _step: &Step, _context: &mut ExecutionContext) -> Result<Value, ActionError> {
        Err(ActionError::Failed(self.0.to_string()))
    }
}

/// Writes `step.params.value` under `step.params.key`.
pub struct WritesParam;

#[async_trait]
impl ActionHandler for WritesParam {
    async fn run(&self, step: &Step, context: &mut ExecutionContext) -> Result<Value, ActionError> {
        let key = step
            .param("key")
            .and_then(Value::as_str)
            .ok_or_else(|| ActionError::MissingInput("key".to_string()))?;
        let value = step.param("value").cloned().unwrap_or(Value::Null);
        context.insert(key, value);
        Ok(json!({ "written": key }))
    }
}

/// Returns the context value under `step.params.key`.
pub struct ReadsParam;

#[async_trait]
impl ActionHandler for ReadsParam {
    async fn run(&self, step: &Step, context: &mut ExecutionContext) -> Result<Value, ActionError> {
        let key = step
            .param("key")
            .and_then(Value::as_str)
            .ok_or_else(|| ActionError::MissingInput("key".to_string()))?;
        Ok(context.get(key).cloned().unwrap_or(Value::Null))
    }
}

/// Reports which engine-owned keys are present.
pub struct Inspect;

#[async_trait]
impl ActionHandler for Inspect {
    async fn run(&self, _step: &Step, context: &mut ExecutionContext) -> Result<Value, ActionError> {
        Ok(json!({
            "hasThread": context.contains(keys::THREAD),
            "hasThreadState": context.contains(keys::THREAD_STATE),
            "policy": context.policy().cloned().unwrap_or(Value::Null),
        }))
    }
}
