//! Plans and steps.
//!
//! A [`Plan`] is the ordered list of named actions supplied with a task.
//! Steps run in list order, each at most once. The only structural change the
//! engine ever makes is a single [`Plan::prepend`] before the first step runs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known action names the engine's termination rules and plan mutation
/// rule refer to.
pub mod actions {
    pub const EVALUATE_OFFER: &str = "evaluateOffer";
    pub const VALIDATE_COUNTER_OFFER: &str = "validateCounterOffer";
    pub const EVALUATE_OFFER_AGAINST_HISTORY: &str = "evaluateOfferAgainstHistory";
    pub const DRAFT_REPLY: &str = "draftReply";
}

/// A single named action in a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Registry name of the action to run
    pub action: String,
    /// Optional step parameters, handed to the action untouched
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl Step {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: Map::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Look up a step parameter.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }
}

/// Ordered sequence of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Whether any step in the plan runs the given action.
    pub fn contains_action(&self, action: &str) -> bool {
        self.steps.iter().any(|s| s.action == action)
    }

    /// Insert a step in front of every existing step.
    pub fn prepend(&mut self, step: Step) {
        self.steps.insert(0, step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
