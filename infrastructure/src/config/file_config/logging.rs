//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Also write tracing output to this file
    pub file: Option<PathBuf>,
    /// JSONL execution event log; disabled when unset
    pub execution_log: Option<PathBuf>,
}
