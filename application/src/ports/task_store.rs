//! Task Store port
//!
//! Durable storage for task records. The engine reads a task once and then
//! writes exactly the partial updates in [`TaskUpdate`].

use super::StoreError;
use async_trait::async_trait;
use dealflow_domain::{OutputEntry, Task, TaskId, TaskOutcome};

/// The partial updates the engine performs.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskUpdate {
    /// `{status: "running"}`
    Running,
    /// `{status: "success", output}`
    Succeeded { output: Vec<OutputEntry> },
    /// `{status: "error", error}`
    Failed { error: String },
}

impl TaskUpdate {
    /// The terminal write for an outcome.
    pub fn terminal(outcome: &TaskOutcome) -> Self {
        match outcome {
            TaskOutcome::Failed { error } => TaskUpdate::Failed {
                error: error.clone(),
            },
            other => TaskUpdate::Succeeded {
                output: other.output().unwrap_or_default(),
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskUpdate::Running)
    }
}

/// Port for task persistence
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a new task
    async fn insert(&self, task: &Task) -> Result<(), StoreError>;

    /// Get a task by id
    async fn get(&self, id: &TaskId) -> Result<Option<Task>, StoreError>;

    /// Apply a partial update to an existing task
    async fn update(&self, id: &TaskId, update: TaskUpdate) -> Result<(), StoreError>;
}
