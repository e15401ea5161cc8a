//! Policy configuration from TOML (`[policy]` section)
//!
//! ```toml
//! [policy]
//! negotiation_style = "balanced"
//! min_rate = 5000
//!
//! [policy.users.u1]
//! target_rate = 9000
//! ```
//!
//! A user override replaces only the fields it sets.

use super::ConfigIssue;
use dealflow_domain::NegotiationPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw policy configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePolicyConfig {
    pub negotiation_style: String,
    pub negotiation_ceiling_pct: f64,
    pub sandbox_mode: bool,
    pub auto_send_negotiation: bool,
    pub min_rate: f64,
    pub target_rate: f64,
    /// Per-user overrides keyed by user id
    pub users: HashMap<String, FilePolicyOverride>,
}

impl Default for FilePolicyConfig {
    fn default() -> Self {
        let defaults = NegotiationPolicy::default();
        Self {
            negotiation_style: defaults.negotiation_style,
            negotiation_ceiling_pct: defaults.negotiation_ceiling_pct,
            sandbox_mode: defaults.sandbox_mode,
            auto_send_negotiation: defaults.auto_send_negotiation,
            min_rate: defaults.min_rate,
            target_rate: defaults.target_rate,
            users: HashMap::new(),
        }
    }
}

/// Field-wise override for one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePolicyOverride {
    pub negotiation_style: Option<String>,
    pub negotiation_ceiling_pct: Option<f64>,
    pub sandbox_mode: Option<bool>,
    pub auto_send_negotiation: Option<bool>,
    pub min_rate: Option<f64>,
    pub target_rate: Option<f64>,
}

impl FilePolicyConfig {
    /// Effective policy for `user_id`: the defaults with the user's
    /// overrides applied. Unknown users and `None` get the defaults.
    pub fn resolve(&self, user_id: Option<&str>) -> NegotiationPolicy {
        let mut policy = NegotiationPolicy {
            negotiation_style: self.negotiation_style.clone(),
            negotiation_ceiling_pct: self.negotiation_ceiling_pct,
            sandbox_mode: self.sandbox_mode,
            auto_send_negotiation: self.auto_send_negotiation,
            min_rate: self.min_rate,
            target_rate: self.target_rate,
        };

        let Some(o) = user_id.and_then(|id| self.users.get(id)) else {
            return policy;
        };
        if let Some(style) = &o.negotiation_style {
            policy.negotiation_style = style.clone();
        }
        if let Some(pct) = o.negotiation_ceiling_pct {
            policy.negotiation_ceiling_pct = pct;
        }
        if let Some(sandbox) = o.sandbox_mode {
            policy.sandbox_mode = sandbox;
        }
        if let Some(auto_send) = o.auto_send_negotiation {
            policy.auto_send_negotiation = auto_send;
        }
        if let Some(min) = o.min_rate {
            policy.min_rate = min;
        }
        if let Some(target) = o.target_rate {
            policy.target_rate = target;
        }
        policy
    }
}

pub(super) fn check(prefix: &str, policy: &NegotiationPolicy) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    if policy.negotiation_ceiling_pct < 0.0 {
        issues.push(ConfigIssue::error(
            format!("{prefix}.negotiation_ceiling_pct"),
            format!(
                "negotiation_ceiling_pct must not be negative (got {})",
                policy.negotiation_ceiling_pct
            ),
        ));
    }
    if policy.min_rate > policy.target_rate {
        issues.push(ConfigIssue::error(
            format!("{prefix}.min_rate"),
            format!(
                "min_rate ({}) is above target_rate ({})",
                policy.min_rate, policy.target_rate
            ),
        ));
    }
    if !matches!(
        policy.negotiation_style.as_str(),
        "balanced" | "assertive" | "flexible"
    ) {
        issues.push(ConfigIssue::warning(
            format!("{prefix}.negotiation_style"),
            format!(
                "unknown negotiation_style '{}', drafts use the balanced tone",
                policy.negotiation_style
            ),
        ));
    }
    issues
}
