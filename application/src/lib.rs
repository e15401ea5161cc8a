//! Application layer for dealflow
//!
//! This crate contains the task engine use case, the negotiation thread
//! service and the port definitions that infrastructure adapters implement.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    StoreError,
    action_handler::{ActionError, ActionHandler, ActionRegistry},
    execution_logger::{ExecutionEvent, ExecutionLogger, NoExecutionLogger},
    policy_supplier::{PolicyError, PolicySupplier},
    progress::{NoProgress, TaskProgressNotifier},
    task_store::{TaskStore, TaskUpdate},
    thread_store::ThreadStore,
};
pub use use_cases::execute_task::{ExecuteTaskError, ExecuteTaskUseCase};
pub use use_cases::negotiation_threads::NegotiationThreadService;
