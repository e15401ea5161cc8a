//! Configuration file loading for dealflow
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `DEALFLOW_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./dealflow.toml` or `./.dealflow.toml`
//! 4. Global: `$XDG_CONFIG_HOME/dealflow/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, FileConfig, FileLoggingConfig, FilePolicyConfig, FilePolicyOverride,
    FileStoreConfig, Severity,
};
pub use loader::{ConfigLoader, ConfigSource};
