//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level errors
//! - [`id`]: opaque string identifiers for tasks, users, threads and messages

pub mod error;
pub mod id;
