//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod action_handler;
pub mod execution_logger;
pub mod policy_supplier;
pub mod progress;
pub mod task_store;
pub mod thread_store;

use thiserror::Error;

/// Errors shared by the persistence ports
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("Stored data could not be decoded: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Check if this error is a uniqueness violation
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}
