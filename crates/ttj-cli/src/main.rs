//! CLI for extracting shipping records from Timber Trades Journal
//! transcriptions.

mod commands;
mod source;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, normalize, parse};

/// Timber Trades Journal extraction - structured shipping records from
/// OCR'd journal pages
#[derive(Parser)]
#[command(name = "ttj")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a single transcription file
    Parse(parse::ParseArgs),

    /// Parse a directory of transcription files, grouping multipage issues
    Batch(batch::BatchArgs),

    /// Normalize extracted entity names against authority lists
    Normalize(normalize::NormalizeArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Parse(args) => parse::run(args, cli.config.as_deref()),
        Commands::Batch(args) => batch::run(args, cli.config.as_deref()),
        Commands::Normalize(args) => normalize::run(args, cli.config.as_deref()),
    }
}
