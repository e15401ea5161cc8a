//! User-scoped negotiation policy.
//!
//! The engine treats a [`Policy`] as an opaque JSON document: it is loaded
//! once per execution, placed into the execution context under `policy`, and
//! only ever read by action handlers.
//!
//! The built-in negotiation actions read the fields of [`NegotiationPolicy`];
//! missing fields take their defaults and unknown fields are ignored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Policy(Value);

impl Policy {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Typed view of the negotiation fields.
    pub fn negotiation(&self) -> Result<NegotiationPolicy, serde_json::Error> {
        NegotiationPolicy::deserialize(&self.0)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl From<Value> for Policy {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<NegotiationPolicy> for Policy {
    fn from(policy: NegotiationPolicy) -> Self {
        // A struct of plain fields always serializes to an object.
        Self(serde_json::to_value(policy).unwrap_or_default())
    }
}

/// Negotiation settings for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NegotiationPolicy {
    /// Tone of drafted replies (`balanced`, `assertive`, `flexible`)
    pub negotiation_style: String,
    /// How far above the baseline offer a counter may go, in percent
    pub negotiation_ceiling_pct: f64,
    /// Never send anything automatically
    pub sandbox_mode: bool,
    pub auto_send_negotiation: bool,
    /// Offers below this are high risk
    pub min_rate: f64,
    /// Offers at or above this need no counter
    pub target_rate: f64,
}

impl NegotiationPolicy {
    /// Whether drafted replies may go out without a human.
    pub fn auto_send(&self) -> bool {
        !self.sandbox_mode && self.auto_send_negotiation
    }
}

impl Default for NegotiationPolicy {
    fn default() -> Self {
        Self {
            negotiation_style: "balanced".to_string(),
            negotiation_ceiling_pct: 15.0,
            sandbox_mode: true,
            auto_send_negotiation: false,
            min_rate: 5000.0,
            target_rate: 7500.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_take_defaults() {
        let policy = Policy::new(json!({ "minRate": 3000, "extra": true }));
        let negotiation = policy.negotiation().unwrap();

        assert_eq!(negotiation.min_rate, 3000.0);
        assert_eq!(negotiation.target_rate, 7500.0);
        assert_eq!(negotiation.negotiation_style, "balanced");
        assert!(negotiation.sandbox_mode);
    }

    #[test]
    fn test_wrong_field_type_is_an_error() {
        let policy = Policy::new(json!({ "minRate": "lots" }));
        assert!(policy.negotiation().is_err());
    }

    #[test]
    fn test_auto_send_requires_sandbox_off() {
        let mut negotiation = NegotiationPolicy {
            auto_send_negotiation: true,
            ..Default::default()
        };
        assert!(!negotiation.auto_send());

        negotiation.sandbox_mode = false;
        assert!(negotiation.auto_send());
    }

    #[test]
    fn test_round_trips_through_policy() {
        let policy = Policy::from(NegotiationPolicy::default());
        assert_eq!(policy.get("negotiationCeilingPct"), Some(&json!(15.0)));
        assert_eq!(policy.negotiation().unwrap(), NegotiationPolicy::default());
    }
}
