//! Policy supplier backed by the `[policy]` config section.

use crate::config::FilePolicyConfig;
use async_trait::async_trait;
use dealflow_application::{PolicyError, PolicySupplier};
use dealflow_domain::{Policy, UserId};
use tracing::debug;

/// Resolves each user's policy from the config defaults and their overrides.
pub struct ConfigPolicySupplier {
    config: FilePolicyConfig,
}

impl ConfigPolicySupplier {
    pub fn new(config: FilePolicyConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PolicySupplier for ConfigPolicySupplier {
    async fn load(&self, user_id: Option<&UserId>) -> Result<Policy, PolicyError> {
        let resolved = self.config.resolve(user_id.map(UserId::as_str));
        if resolved.min_rate > resolved.target_rate {
            return Err(PolicyError::Invalid(format!(
                "min_rate {} is above target_rate {}",
                resolved.min_rate, resolved.target_rate
            )));
        }
        debug!(
            user_id = user_id.map(UserId::as_str).unwrap_or("-"),
            style = %resolved.negotiation_style,
            "Resolved policy"
        );
        Ok(Policy::from(resolved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilePolicyOverride;
    use serde_json::json;

    #[tokio::test]
    async fn test_default_policy_for_anonymous_task() {
        let supplier = ConfigPolicySupplier::new(FilePolicyConfig::default());

        let policy = supplier.load(None).await.unwrap();

        assert_eq!(policy.get("negotiationStyle"), Some(&json!("balanced")));
        assert_eq!(policy.get("sandboxMode"), Some(&json!(true)));
        assert_eq!(policy.get("minRate"), Some(&json!(5000.0)));
    }

    #[tokio::test]
    async fn test_user_override_applies() {
        let mut config = FilePolicyConfig::default();
        config.users.insert(
            "u1".to_string(),
            FilePolicyOverride {
                negotiation_ceiling_pct: Some(25.0),
                ..Default::default()
            },
        );
        let supplier = ConfigPolicySupplier::new(config);

        let policy = supplier.load(Some(&UserId::new("u1"))).await.unwrap();

        assert_eq!(policy.negotiation().unwrap().negotiation_ceiling_pct, 25.0);
    }

    #[tokio::test]
    async fn test_inverted_rates_are_rejected() {
        let config = FilePolicyConfig {
            min_rate: 9000.0,
            ..Default::default()
        };
        let supplier = ConfigPolicySupplier::new(config);

        let result = supplier.load(None).await;
        assert!(matches!(result, Err(PolicyError::Invalid(_))));
    }
}
