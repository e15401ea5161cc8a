//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to domain types where needed.

mod logging;
mod policy;
mod store;

pub use logging::FileLoggingConfig;
pub use policy::{FilePolicyConfig, FilePolicyOverride};
pub use store::FileStoreConfig;

use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Task and thread storage
    pub store: FileStoreConfig,
    /// Diagnostic and execution logs
    pub logging: FileLoggingConfig,
    /// Default negotiation policy and per-user overrides
    pub policy: FilePolicyConfig,
}

/// How serious a configuration issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A single problem found by [`FileConfig::validate`]
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Dotted path of the offending key
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.store.path.as_os_str().is_empty() {
            issues.push(ConfigIssue::error("store.path", "store.path must not be empty"));
        }

        let default = self.policy.resolve(None);
        issues.extend(policy::check("policy", &default));

        let mut users: Vec<&String> = self.policy.users.keys().collect();
        users.sort();
        for user in users {
            let resolved = self.policy.resolve(Some(user));
            issues.extend(policy::check(&format!("policy.users.{user}"), &resolved));
        }

        issues
    }

    /// Whether any issue must stop the program.
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == Severity::Error)
    }
}
