//! Operator CLI for Branchwarden.
//!
//! `branchwarden run` starts the reconciliation loop and logs lifecycle
//! events until interrupted. The remaining subcommands are one-shot front-end
//! operations against the same registry file and repository clone.

use branchwarden::catalog::CatalogError;
use branchwarden::config::{Config, ConfigError, load_config};
use branchwarden::initiator::{InitiatorError, TaskInitiator};
use branchwarden::logging;
use branchwarden::monitor::{
    adapters::TracingSink,
    services::{MonitorSettings, ReconciliationLoop},
};
use branchwarden::task::{
    adapters::JsonFileTaskRepository,
    domain::{ModuleKey, Task, TaskDomainError, TaskKind},
    services::TaskRegistry,
};
use branchwarden::vcs::{adapters::GitCli, services::BranchOracle, services::MergeCoordinator};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use mockable::DefaultClock;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "branchwarden",
    version,
    about = "Reconciles content generation tasks with their remote branches"
)]
struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = "branchwarden.toml")]
    config: Utf8PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the reconciliation loop until interrupted.
    Run,
    /// Create one task and print its prompt.
    Create {
        /// `glossary` or `tests`.
        #[arg(value_parser = parse_kind)]
        kind: TaskKind,
        /// Book code or display name.
        book: String,
        /// Module number.
        module: u32,
    },
    /// Create the glossary and tests tasks of a module and print both prompts.
    Pair {
        /// Book code or display name.
        book: String,
        /// Module number.
        module: u32,
    },
    /// List active tasks.
    List {
        /// Only tasks waiting for merge.
        #[arg(long)]
        ready: bool,
    },
    /// Merge a ready module into the integration branch.
    Merge {
        /// Book code or display name.
        book: String,
        /// Module number.
        module: u32,
    },
    /// Drop every task and delete every branch under the prefix.
    Clear {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
    /// Print a summary of the registry.
    Status,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Initiator(#[from] InitiatorError),

    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),

    #[error("failed to listen for interrupt: {0}")]
    Signal(#[source] io::Error),

    #[error("refusing to clear without --yes")]
    Unconfirmed,
}

type Initiator = TaskInitiator<JsonFileTaskRepository, GitCli, GitCli, DefaultClock>;

fn parse_kind(value: &str) -> Result<TaskKind, String> {
    TaskKind::try_from(value).map_err(|err| err.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init(logging::DEFAULT_FILTER);
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "branchwarden failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli.config)?;
    let catalog = Arc::new(config.catalog()?);
    let clock = Arc::new(DefaultClock);
    let git = Arc::new(GitCli::new(
        config.repository.workdir.clone(),
        config.repository.remote.clone(),
    ));
    let registry = Arc::new(TaskRegistry::new(
        Arc::new(JsonFileTaskRepository::new(&config.state_path)),
        Arc::clone(&clock),
    ));

    if matches!(cli.command, Command::Run) {
        return run_loop(&config, registry, git, clock).await;
    }

    let initiator: Initiator = TaskInitiator::new(
        registry,
        Arc::clone(&git),
        MergeCoordinator::new(git, config.repository.integration_branch.clone()),
        catalog,
        config.repository.branch_prefix.clone(),
    );
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Run => Ok(()),
        Command::Create { kind, book, module } => {
            let created = initiator.create_task(kind, &book, module).await?;
            writeln!(out, "created {} task {}\n", kind, created.task.id())?;
            writeln!(out, "{}", created.prompt)?;
            Ok(())
        }
        Command::Pair { book, module } => {
            let created = initiator.create_module_pair(&book, module).await?;
            writeln!(out, "created module group {}\n", created.pair.group_id)?;
            writeln!(out, "{}\n\n{}", created.glossary_prompt, created.tests_prompt)?;
            Ok(())
        }
        Command::List { ready } => {
            let tasks = if ready {
                initiator.list_ready_to_merge().await?
            } else {
                initiator.list_active().await?
            };
            for task in &tasks {
                writeln!(out, "{}", describe(task))?;
            }
            Ok(())
        }
        Command::Merge { book, module } => {
            let entry = initiator.catalog().resolve(&book)?;
            let key = ModuleKey::new(entry.name.clone(), module)?;
            let report = initiator.request_merge(&key).await?;
            writeln!(out, "{}", report.steps.join("\n"))?;
            Ok(())
        }
        Command::Clear { yes } => {
            if !yes {
                return Err(CliError::Unconfirmed);
            }
            let report = initiator.clear_all().await?;
            writeln!(
                out,
                "removed {} tasks, deleted {} branches",
                report.tasks_removed,
                report.deleted.len()
            )?;
            for failure in &report.errors {
                writeln!(out, "error: {failure}")?;
            }
            Ok(())
        }
        Command::Status => {
            let status = initiator.status_report().await?;
            writeln!(out, "{status}")?;
            Ok(())
        }
    }
}

async fn run_loop(
    config: &Config,
    registry: Arc<TaskRegistry<JsonFileTaskRepository, DefaultClock>>,
    git: Arc<GitCli>,
    clock: Arc<DefaultClock>,
) -> Result<(), CliError> {
    let monitor = ReconciliationLoop::new(
        registry,
        BranchOracle::new(git, clock),
        Arc::new(TracingSink),
        MonitorSettings::from_config(config),
    );
    let handle = monitor.spawn();

    tokio::signal::ctrl_c().await.map_err(CliError::Signal)?;
    info!("interrupted, stopping reconciliation loop");
    handle.abort();
    Ok(())
}

fn describe(task: &Task) -> String {
    let branch = task.branch().map_or("-", |branch| branch.as_str());
    format!(
        "{}  {:<8} {:<40} {:<14} {}",
        task.id(),
        task.kind().as_str(),
        task.module_key().to_string(),
        task.status().as_str(),
        branch
    )
}
