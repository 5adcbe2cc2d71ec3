//! Voxpos CLI - Command-line interface for the voxpos ordering assistant.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use voxpos_resolver::UnknownActionPolicy;

mod commands;

/// Voxpos - voice-driven ordering for point-of-sale
#[derive(Parser)]
#[command(name = "voxpos")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Bind host (default: VOXPOS_HOST or 0.0.0.0)
        #[arg(long)]
        host: Option<String>,
        /// Bind port (default: VOXPOS_PORT or 8080)
        #[arg(short, long)]
        port: Option<u16>,
        /// Treatment of verbs other than add/remove: `add` or `reject`
        /// (default: VOXPOS_UNKNOWN_ACTION or add)
        #[arg(long)]
        unknown_action: Option<UnknownActionPolicy>,
    },

    /// Show the seed menu
    Menu {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the intent system prompt for the seed menu
    Prompt,

    /// Resolve an intent payload file against the seed menu
    Resolve {
        /// JSON file holding the model output
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run one voice ordering turn from an audio file
    Order {
        /// Audio file (mp3, webm, wav, ...)
        audio: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let default_filter = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (Commands::Serve { .. }, false) => "info",
        _ => "warn",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    match cli.command {
        Commands::Serve {
            host,
            port,
            unknown_action,
        } => block_on(commands::serve::run(host, port, unknown_action)),
        Commands::Menu { json } => commands::menu::run(json),
        Commands::Prompt => commands::prompt::run(),
        Commands::Resolve { file, json } => commands::resolve::run(&file, json),
        Commands::Order { audio, json } => block_on(commands::order::run(&audio, json)),
    }
}

fn block_on<F>(future: F) -> miette::Result<()>
where
    F: std::future::Future<Output = miette::Result<()>>,
{
    tokio::runtime::Runtime::new()
        .map_err(|e| miette::miette!("Failed to start async runtime: {}", e))?
        .block_on(future)
}
