//! tuner - command-line front end
//!
//! `tuner [--config PATH] [--dry-run] [--verbose] [--json] <convert|clean|add> <DIR>`

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;
use tuner::reporters::{DetailedReporter, JsonReporter, Sink};
use tuner::{Collaborators, WorkflowOrchestrator};
use tuner_common::config::{load_config, TomlConfig};
use tuner_common::events::{EventBus, TunerCommand};

#[derive(Debug, Parser)]
#[command(name = "tuner", version, about = "Convert, clean and catalogue album directories")]
struct Args {
    /// Config file (overrides TUNER_CONFIG and the per-user default)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Report what would happen without changing anything
    #[arg(short = 'n', long, global = true)]
    dry_run: bool,

    /// Debug logging, including every tool command line
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print events as JSON lines instead of the progress report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Transcode every track and embed the cover
    Convert { dir: PathBuf },
    /// Delete source tracks and playlists from a converted directory
    Clean { dir: PathBuf },
    /// Add converted tracks to the music library
    Add { dir: PathBuf },
}

impl Command {
    fn split(self) -> (TunerCommand, PathBuf) {
        match self {
            Command::Convert { dir } => (TunerCommand::Convert, dir),
            Command::Clean { dir } => (TunerCommand::Clean, dir),
            Command::Add { dir } => (TunerCommand::Add, dir),
        }
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn init_tracing(config: &TomlConfig, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load the config under a provisional subscriber
///
/// The configured log level is only known after loading, so the loader's
/// own messages go through a temporary subscriber instead of being lost.
fn load_config_logged<W>(cli_arg: Option<&Path>, filter: EnvFilter, writer: W) -> Result<TomlConfig>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let provisional = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .finish();
    tracing::subscriber::with_default(provisional, || load_config(cli_arg))
        .context("Failed to load configuration")
}

/// Message for a command-line directory that cannot be processed
fn directory_problem(dir: &Path) -> Option<String> {
    if !dir.exists() {
        Some(format!("the directory '{}' does not exist", dir.display()))
    } else if !dir.is_dir() {
        Some(format!("'{}' is not a directory", dir.display()))
    } else {
        None
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let startup_level = if args.verbose { "debug" } else { "info" };
    let config = load_config_logged(
        args.config.as_deref(),
        env_filter(startup_level),
        std::io::stderr,
    )?;
    init_tracing(&config, args.verbose);
    info!("tuner {}", env!("CARGO_PKG_VERSION"));

    let (command, dir) = args.command.split();
    if let Some(problem) = directory_problem(&dir) {
        eprintln!("error: {}", problem);
        return Ok(ExitCode::FAILURE);
    }

    let event_bus = EventBus::default();
    if args.json {
        JsonReporter::new(Sink::stdout()).attach(&event_bus);
    } else {
        DetailedReporter::new(Sink::stdout()).attach(&event_bus);
    }

    let collaborators = Collaborators::from_config(&config);
    let orchestrator = WorkflowOrchestrator::new(config, collaborators, event_bus)
        .context("Invalid configuration")?
        .with_dry_run(args.dry_run);

    match orchestrator.run(command, &dir).await {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::debug!("{} failed: {}", command, e);
            Ok(ExitCode::FAILURE)
        }
    }
}
