//! # Onboarding Copilot CLI (`onboard`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `onboard init` | Create the index schema and log files |
//! | `onboard ingest` | Chunk and index the PDFs in the data directory |
//! | `onboard search "<query>"` | Show the passages retrieval would use |
//! | `onboard ask "<question>"` | Answer a question from the indexed documents |
//! | `onboard plan` | Generate and save a ten-day onboarding plan |
//! | `onboard stats` | Summarize the task and interaction logs |
//!
//! ## Examples
//!
//! ```bash
//! onboard --config ./config/onboard.toml ingest --dir ./handbooks
//! onboard ask "Who do I ask for a laptop?" --name Ada --role "Backend Developer"
//! onboard plan --name Ada --role "Backend Developer" --start 2024-01-08
//! ```

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use onboarding_copilot::analytics::DEFAULT_RECENT;
use onboarding_copilot::commands;
use onboarding_copilot::config::{self, Secrets, DEFAULT_CONFIG_PATH};
use onboarding_copilot::copilot::Copilot;

/// Onboarding Copilot: answers new-hire questions from your onboarding
/// documents and drafts two-week onboarding plans.
#[derive(Parser)]
#[command(name = "onboard", version)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/onboard.toml`; built-in defaults are used
    /// when that file does not exist.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log debug output to stderr (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the index schema and the log files. Safe to run repeatedly.
    Init,

    /// Extract, chunk, embed, and index every PDF in the data directory.
    ///
    /// Re-ingesting a file overwrites its chunks instead of duplicating them.
    Ingest {
        /// Directory to scan instead of `ingest.data_dir`.
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Show file, page, and chunk counts without embedding or writing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the passages retrieved for a query, with scores and sources.
    Search {
        query: String,

        /// Number of passages (default: `retrieval.top_k`).
        #[arg(long, short)]
        k: Option<usize>,
    },

    /// Answer a question from the indexed documents.
    ///
    /// The exchange is logged when `--name` or `--role` is given.
    Ask {
        question: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        role: Option<String>,
    },

    /// Generate a ten-day onboarding plan and append it to the task log.
    Plan {
        #[arg(long)]
        name: String,

        #[arg(long)]
        role: String,

        /// First working day (YYYY-MM-DD).
        #[arg(long)]
        start: NaiveDate,
    },

    /// Summarize the task and interaction logs.
    Stats {
        /// Number of recent questions to list.
        #[arg(long, default_value_t = DEFAULT_RECENT)]
        recent: usize,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    // Commands that don't need model providers
    match &cli.command {
        Commands::Init => return commands::run_init(&cfg).await,
        Commands::Stats { recent } => return commands::run_stats(&cfg, *recent),
        Commands::Ingest { dir, dry_run: true } => {
            return commands::run_ingest_dry_run(&cfg, dir.as_deref())
        }
        _ => {}
    }

    let secrets = Secrets::from_env(&cfg)?;
    let copilot = Copilot::open(cfg, &secrets).await?;

    match cli.command {
        Commands::Ingest { dir, .. } => {
            commands::run_ingest(&copilot, dir.as_deref()).await?;
        }
        Commands::Search { query, k } => {
            commands::run_search(&copilot, &query, k).await?;
        }
        Commands::Ask {
            question,
            name,
            role,
        } => {
            commands::run_ask(&copilot, &question, name.as_deref(), role.as_deref()).await?;
        }
        Commands::Plan { name, role, start } => {
            commands::run_plan(&copilot, &name, &role, start).await?;
        }
        Commands::Init | Commands::Stats { .. } => {
            // Handled above (before provider setup)
        }
    }

    Ok(())
}
