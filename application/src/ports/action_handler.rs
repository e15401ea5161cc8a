//! Action handler port and registry
//!
//! Business actions are addressed by name. Each one implements
//! [`ActionHandler`]: it reads the step and the execution context, may write
//! to the context, and returns a JSON result that the engine records and
//! checks against the termination rules.
//!
//! # Usage
//!
//! ```ignore
//! let registry = ActionRegistry::new()
//!     .register("evaluateOffer", EvaluateOffer)
//!     .register("draftReply", DraftReply);
//!
//! let handler = registry.get("evaluateOffer").expect("registered");
//! let result = handler.run(&step, &mut context).await?;
//! ```

use async_trait::async_trait;
use dealflow_domain::{DomainError, ExecutionContext, Step};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Error raised by an action handler
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Context error: {0}")]
    Context(#[from] DomainError),

    #[error("{0}")]
    Failed(String),
}

/// A named, pluggable unit of business logic.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Run the action for one step.
    async fn run(&self, step: &Step, context: &mut ExecutionContext) -> Result<Value, ActionError>;
}

/// Name → handler table, built once at startup.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any handler with the same name.
    pub fn register<H: ActionHandler + 'static>(self, name: impl Into<String>, handler: H) -> Self {
        self.register_arc(name, Arc::new(handler))
    }

    /// Register a shared handler (Arc version).
    pub fn register_arc(mut self, name: impl Into<String>, handler: Arc<dyn ActionHandler>) -> Self {
        let name = name.into();
        if self.handlers.insert(name.clone(), handler).is_some() {
            tracing::debug!(action = %name, "Replaced registered action handler");
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Constant(Value);

    #[async_trait]
    impl ActionHandler for Constant {
        async fn run(&self, _step: &Step, _context: &mut ExecutionContext) -> Result<Value, ActionError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_lookup_by_name() {
        let registry = ActionRegistry::new().register("sendIntro", Constant(json!("sent")));

        assert!(registry.contains("sendIntro"));
        assert!(registry.get("doesNotExist").is_none());

        let handler = registry.get("sendIntro").unwrap();
        let mut ctx = ExecutionContext::default();
        let result = handler.run(&Step::new("sendIntro"), &mut ctx).await.unwrap();
        assert_eq!(result, json!("sent"));
    }

    #[test]
    fn test_later_registration_replaces_earlier() {
        let registry = ActionRegistry::new()
            .register("b", Constant(json!(1)))
            .register("a", Constant(json!(2)))
            .register("b", Constant(json!(3)));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["a", "b"]);
    }
}
