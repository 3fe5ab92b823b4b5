//! moviequiz CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "moviequiz", version, about = "Movie rating quiz for the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play quiz rounds in the terminal
    Play {
        /// Deck file to play (overrides the configured supplier)
        #[arg(long)]
        deck: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Questions per round
        #[arg(long)]
        questions: Option<usize>,

        /// Pause after each answer, in milliseconds
        #[arg(long)]
        answer_delay_ms: Option<u64>,

        /// Game history file
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Show lifetime statistics
    Stats {
        /// Game history file
        #[arg(long)]
        history: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Number of recent games to list
        #[arg(long, default_value = "10")]
        recent: usize,
    },

    /// Validate deck TOML files
    Validate {
        /// Path to deck file or directory
        #[arg(long)]
        deck: PathBuf,

        /// Round length to check the deck against
        #[arg(long, default_value = "10")]
        questions: usize,
    },

    /// Create starter config and example deck
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("moviequiz=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            deck,
            config,
            questions,
            answer_delay_ms,
            history,
        } => commands::play::execute(deck, config, questions, answer_delay_ms, history).await,
        Commands::Stats {
            history,
            config,
            format,
            recent,
        } => commands::stats::execute(history, config, format, recent),
        Commands::Validate { deck, questions } => commands::validate::execute(deck, questions),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
