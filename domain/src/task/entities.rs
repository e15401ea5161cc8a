//! Task entity and lifecycle status

use super::outcome::OutputEntry;
use super::plan::Plan;
use crate::core::error::DomainError;
use crate::core::id::{TaskId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle status of a task.
///
/// `queued -> running -> success | error`. Only the engine moves a task out
/// of `queued`, and a terminal task is never re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Queued,
    Running,
    Success,
    Error,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Running => "running",
            TaskStatus::Success => "success",
            TaskStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Error)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "queued" => Ok(TaskStatus::Queued),
            "running" => Ok(TaskStatus::Running),
            "success" => Ok(TaskStatus::Success),
            "error" => Ok(TaskStatus::Error),
            other => Err(DomainError::InvalidStatus(other.to_string())),
        }
    }
}

/// Immutable snapshot supplied when the task was created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskInput {
    pub plan: Plan,
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl TaskInput {
    pub fn new(plan: Plan) -> Self {
        Self {
            plan,
            context: Map::new(),
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// A unit of agent work: a plan plus its starting context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    /// Owning user; required for negotiation attachment
    pub user_id: Option<UserId>,
    pub status: TaskStatus,
    pub input: TaskInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Vec<OutputEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a queued task with a fresh id.
    pub fn new(user_id: Option<UserId>, input: TaskInput) -> Self {
        Self::with_id(TaskId::generate(), user_id, input)
    }

    pub fn with_id(id: impl Into<TaskId>, user_id: Option<UserId>, input: TaskInput) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            user_id,
            status: TaskStatus::Queued,
            input,
            output: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}
