//! CLI entrypoint for dealflow
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use colored::Colorize;
use dealflow_application::{
    ExecuteTaskUseCase, NegotiationThreadService, NoProgress, TaskProgressNotifier, TaskStore,
    ThreadStore,
};
use dealflow_domain::{Plan, Task, TaskId, TaskInput, TaskOutcome, ThreadId, UserId};
use dealflow_infrastructure::{
    ConfigLoader, ConfigPolicySupplier, FileConfig, JsonFileStore, JsonlExecutionLogger, Severity,
    builtin_registry,
};
use dealflow_presentation::{Cli, Command, ConsoleFormatter, OutputFormat, ProgressReporter};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Task file accepted by `dealflow submit`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskDocument {
    user_id: Option<String>,
    #[serde(default)]
    plan: Plan,
    #[serde(default)]
    context: Map<String, Value>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let _log_guard = init_logging(cli.verbose, config.logging.file.as_deref())?;
    info!("Starting dealflow");

    if let Command::Config = cli.command {
        show_config(cli.config.as_deref(), &config);
        return Ok(());
    }

    let issues = config.validate();
    for issue in &issues {
        warn!(field = %issue.field, "{}", issue.message);
    }
    if FileConfig::has_errors(&issues) {
        bail!("Invalid configuration; run `dealflow config` for details");
    }

    // === Dependency Injection ===
    let store = Arc::new(
        JsonFileStore::open(&config.store.path)
            .await
            .with_context(|| format!("Failed to open store {}", config.store.path.display()))?,
    );

    match cli.command {
        Command::Submit { file } => submit(&store, &file).await,
        Command::Run { task_id, output } => {
            run(&store, &config, &TaskId::new(task_id), output, cli.quiet).await
        }
        Command::ThreadState { thread_id, output } => {
            thread_state(&store, &ThreadId::new(thread_id), output).await
        }
        Command::Config => Ok(()),
    }
}

/// Initialize tracing based on verbosity level, optionally mirrored to a file.
fn init_logging(verbose: u8, file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let (file_layer, guard) = match file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let name = path
                .file_name()
                .ok_or_else(|| anyhow!("logging.file has no file name: {}", path.display()))?;
            if let Some(dir) = dir {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            }
            let appender = tracing_appender::rolling::never(dir.unwrap_or(Path::new(".")), name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new(level));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::new(level)),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

async fn submit(store: &JsonFileStore, file: &Path) -> Result<()> {
    let text = if file == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read task from stdin")?;
        text
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?
    };
    let document: TaskDocument =
        serde_json::from_str(&text).context("Task file is not a valid task document")?;

    let input = TaskInput {
        plan: document.plan,
        context: document.context,
    };
    let task = Task::new(document.user_id.map(UserId::new), input);
    store.insert(&task).await?;

    info!(task_id = %task.id, steps = task.input.plan.len(), "Submitted task");
    println!("{}", task.id);
    Ok(())
}

async fn run(
    store: &Arc<JsonFileStore>,
    config: &FileConfig,
    task_id: &TaskId,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let mut engine = ExecuteTaskUseCase::new(
        Arc::clone(store),
        Arc::clone(store),
        Arc::new(ConfigPolicySupplier::new(config.policy.clone())),
        builtin_registry(),
    );
    if let Some(path) = &config.logging.execution_log
        && let Some(logger) = JsonlExecutionLogger::new(path)
    {
        engine = engine.with_logger(Arc::new(logger));
    }

    let progress: Box<dyn TaskProgressNotifier> = if quiet || output == OutputFormat::Json {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressReporter::new())
    };

    let (outcome, failure) = match engine.execute_with_progress(task_id, progress.as_ref()).await {
        Ok(Some(outcome)) => (outcome, None),
        Ok(None) => {
            eprintln!("{} task {} not found", "warning:".yellow().bold(), task_id);
            return Ok(());
        }
        Err(e) => (
            TaskOutcome::Failed {
                error: e.to_string(),
            },
            Some(e),
        ),
    };

    let rendered = match output {
        OutputFormat::Text => ConsoleFormatter::format_outcome(task_id, &outcome),
        OutputFormat::Json => ConsoleFormatter::format_outcome_json(task_id, &outcome),
    };
    println!("{}", rendered);

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

async fn thread_state(
    store: &Arc<JsonFileStore>,
    thread_id: &ThreadId,
    output: OutputFormat,
) -> Result<()> {
    let Some(thread) = store.get_thread(thread_id).await? else {
        bail!("Thread {} not found", thread_id);
    };
    let state = NegotiationThreadService::new(Arc::clone(store))
        .get_active_thread_state(thread_id)
        .await?;

    let rendered = match output {
        OutputFormat::Text => ConsoleFormatter::format_thread_state(&thread, &state),
        OutputFormat::Json => ConsoleFormatter::format_thread_state_json(&thread, &state),
    };
    println!("{}", rendered);
    Ok(())
}

fn show_config(explicit: Option<&Path>, config: &FileConfig) {
    println!("Configuration sources (in priority order):");
    println!("  [     ] Environment: DEALFLOW_* variables");
    for source in ConfigLoader::sources(explicit) {
        let marker = if source.found { "FOUND" } else { "     " };
        println!("  [{}] {:<8} {}", marker, format!("{}:", source.label), source.path.display());
    }
    println!("  [     ] Default: built-in defaults");
    println!();
    println!("Store: {}", config.store.path.display());
    if let Some(path) = &config.logging.execution_log {
        println!("Execution log: {}", path.display());
    }

    let issues = config.validate();
    if issues.is_empty() {
        println!("{}", "No configuration issues.".green());
        return;
    }
    println!();
    for issue in issues {
        let label = match issue.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        println!("  {} {}: {}", label, issue.field, issue.message);
    }
}
