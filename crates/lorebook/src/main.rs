//! Lorebook CLI binary.
//!
//! This binary provides command-line access to Lorebook:
//! - Extract a consolidated character and scene bible from a text file
//! - Enrich an existing bible after manual edits

use clap::Parser;
use lorebook::{LogFormat, LorebookConfig, init_logging};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use cli::{Cli, Commands, run_enrich, run_extract};

    // GEMINI_API_KEY may live in .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    let directive = if cli.verbose { "debug" } else { "info" };
    init_logging(format, directive).map_err(|e| anyhow::anyhow!(e))?;

    let config = match &cli.config {
        Some(path) => LorebookConfig::from_file(path)?,
        None => LorebookConfig::load()?,
    };

    match &cli.command {
        Commands::Extract(args) => run_extract(args, &config).await?,
        Commands::Enrich(args) => run_enrich(args, &config).await?,
    }

    Ok(())
}
