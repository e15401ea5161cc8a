//! Infrastructure layer for dealflow
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: task and thread stores, the config-backed policy
//! supplier, the built-in negotiation actions and the JSONL execution log,
//! plus configuration file loading.

pub mod actions;
pub mod config;
pub mod logging;
pub mod policy;
pub mod store;

// Re-export commonly used types
pub use actions::{
    DraftReply, EvaluateOffer, EvaluateOfferAgainstHistory, ValidateCounterOffer,
    builtin_registry,
};
pub use config::{ConfigIssue, ConfigLoader, ConfigSource, FileConfig, Severity};
pub use logging::JsonlExecutionLogger;
pub use policy::ConfigPolicySupplier;
pub use store::{InMemoryStore, JsonFileStore};
