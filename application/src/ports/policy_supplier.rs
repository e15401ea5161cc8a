//! Policy Supplier port

use async_trait::async_trait;
use dealflow_domain::{Policy, UserId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Policy unavailable for user {user}: {reason}")]
    Unavailable { user: String, reason: String },

    #[error("Invalid policy: {0}")]
    Invalid(String),
}

/// Loads the read-only policy for a user.
#[async_trait]
pub trait PolicySupplier: Send + Sync {
    /// Load the policy for `user_id`; `None` yields the default policy.
    async fn load(&self, user_id: Option<&UserId>) -> Result<Policy, PolicyError>;
}
