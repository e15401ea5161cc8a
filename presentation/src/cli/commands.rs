//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored summary
    Text,
    /// JSON output
    Json,
}

/// CLI arguments for dealflow
#[derive(Parser, Debug)]
#[command(name = "dealflow")]
#[command(author, version, about = "Agent task engine for brand deal negotiations")]
#[command(long_about = r#"
dealflow runs agent tasks: ordered plans of named actions executed against a
shared context. Tasks that carry an inbound email are attached to the
negotiation thread with that counterparty, and the thread's offer history
decides whether a counter-offer is worth making.

Configuration files are loaded from (in priority order):
1. DEALFLOW_* environment variables (e.g. DEALFLOW_STORE__PATH)
2. --config <path>     Explicit config file
3. ./dealflow.toml     Project-level config
4. ~/.config/dealflow/config.toml   Global config

Example:
  dealflow submit task.json
  dealflow run 1f0c2b9e-...
  dealflow run 1f0c2b9e-... --output json
  dealflow thread-state 7d3a...
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a queued task from a JSON file ({"userId", "plan", "context"})
    Submit {
        /// Task document; `-` reads standard input
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Execute a stored task
    Run {
        #[arg(value_name = "TASK_ID")]
        task_id: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show the offer state derived from a negotiation thread
    ThreadState {
        #[arg(value_name = "THREAD_ID")]
        thread_id: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show configuration sources and validation issues
    Config,
}
