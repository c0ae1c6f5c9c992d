//! tiku: terminal front-end for practicing from CSV question banks.

use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use services::{AppServices, Clock};
use tiku_core::model::PoolKind;
use tracing_subscriber::EnvFilter;

mod commands;
mod terminal;

use terminal::Terminal;

#[derive(Parser)]
#[command(name = "tiku", version, about = "Question bank practice in the terminal")]
struct Cli {
    /// Directory holding the question bank CSV files
    #[arg(long, global = true, env = "TIKU_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Settings file (default: <data-dir>/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Random practice over one pool: choice, fill or judge
    Practice {
        #[arg(value_parser = parse_practice_kind)]
        kind: PoolKind,

        /// Questions per session
        #[arg(long, default_value_t = services::session::DEFAULT_SESSION_SIZE)]
        size: usize,
    },

    /// Unscored review of chosen lookup entries
    Review {
        /// Comma-separated entry ids, or "all"; asked interactively when omitted
        #[arg(long)]
        ids: Option<String>,
    },

    /// Search lookup entries by keyword
    Search {
        keyword: String,

        /// Ask the explanation endpoint about the first hit
        #[arg(long)]
        explain: bool,
    },

    /// Show or change explanation settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Check the explanation endpoint with a short request
    TestApi,

    /// Show how many questions each pool holds
    Stats,
}

#[derive(Subcommand)]
pub(crate) enum SettingsAction {
    /// Print current settings
    Show,

    /// List suggested models
    Models,

    /// Save settings; the API key is required but never written
    Set {
        #[arg(long, env = "SILICON_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        #[arg(long)]
        api_url: Option<String>,

        #[arg(long)]
        model: Option<String>,

        /// Ask the model to think before answering
        #[arg(long)]
        reasoning: Option<bool>,

        #[arg(long)]
        system_prompt: Option<String>,
    },
}

fn parse_practice_kind(raw: &str) -> Result<PoolKind, String> {
    let kind: PoolKind = raw.parse().map_err(|err| format!("{err}"))?;
    if PoolKind::PRACTICE.contains(&kind) {
        Ok(kind)
    } else {
        Err(format!("{kind} cannot be practiced; use choice, fill or judge"))
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    tracing::debug!(data_dir = %cli.data_dir.display(), "loading question bank");
    let mut services = AppServices::from_files(&cli.data_dir, cli.config, Clock::default()).await?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut term = Terminal::new(stdin.lock(), stdout.lock());

    match cli.command {
        Commands::Practice { kind, size } => {
            let services = services.with_session_size(size);
            commands::practice::execute(&services, kind, &mut term).await
        }
        Commands::Review { ids } => commands::review::execute(&services, ids, &mut term).await,
        Commands::Search { keyword, explain } => {
            commands::search::execute(&services, &keyword, explain, &mut term).await
        }
        Commands::Settings { action } => {
            commands::settings::execute(&mut services, action, &mut term).await
        }
        Commands::TestApi => commands::settings::test_api(&services, &mut term).await,
        Commands::Stats => commands::stats::execute(&services, &mut term),
    }
}
