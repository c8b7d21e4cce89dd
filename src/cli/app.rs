//! Main CLI application structure

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{query, task};
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "planner")]
#[command(author, version, about = "Local-first study and task planner")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new planner project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage tasks
    #[command(subcommand)]
    Task(task::TaskCommands),

    /// Show open tasks by priority, then deadline
    Priority,

    /// Show all tasks in dependency order
    Order,

    /// Suggest what to work on today
    Suggest {
        /// Number of suggestions (defaults to suggest_count in config)
        #[arg(long, short = 'n')]
        count: Option<usize>,

        /// Treat this date as today (YYYY-MM-DD)
        #[arg(long, env = "PLANNER_TODAY")]
        today: Option<NaiveDate>,
    },

    /// Show completion statistics
    Stats {
        /// Treat this date as today (YYYY-MM-DD)
        #[arg(long, env = "PLANNER_TODAY")]
        today: Option<NaiveDate>,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("Planner starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Created .planner directory at: {}", project.planner_dir().display()),
            );
            output.success(&format!(
                "Initialized planner project at {}",
                project.root().display()
            ));
        }

        Commands::Task(cmd) => task::run(cmd, &output)?,

        Commands::Priority => query::priority(&output)?,
        Commands::Order => query::order(&output)?,
        Commands::Suggest { count, today } => {
            output.verbose_ctx("suggest", &format!("count={:?}, today={:?}", count, today));
            query::suggest(&output, count, today)?
        }
        Commands::Stats { today } => query::stats(&output, today)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

/// Installs the log subscriber; `RUST_LOG` overrides the verbosity flag
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
