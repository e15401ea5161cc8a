//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod execute_task;
pub mod negotiation_threads;

#[cfg(test)]
pub(crate) mod test_support;
