//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Lorebook - build a visual bible of characters and scenes from a novel
#[derive(Parser, Debug)]
#[command(name = "lorebook")]
#[command(about = "Build a visual bible of characters and scenes from a novel", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file (defaults to ./lorebook.toml and ~/.config/lorebook/lorebook.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract and consolidate characters and scenes from a text file
    Extract(ExtractArgs),

    /// Fill in thin descriptions of an existing entity file
    Enrich(EnrichArgs),
}

/// Arguments of `lorebook extract`
#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Plain-text document to analyze
    #[arg(long)]
    pub input: PathBuf,

    /// Where to write the consolidated characters and scenes (JSON)
    #[arg(long)]
    pub output: PathBuf,

    /// Where to write the per-chunk debug log (JSON)
    #[arg(long)]
    pub debug_log: Option<PathBuf>,

    /// File whose contents replace the default extraction instructions
    #[arg(long)]
    pub prompt: Option<PathBuf>,

    /// Minimum milliseconds between chunk requests
    #[arg(long)]
    pub pace_ms: Option<u64>,

    /// Maximum chunk length in characters
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Earlier result (JSON) to extend instead of starting empty
    #[arg(long)]
    pub seed: Option<PathBuf>,
}

/// Arguments of `lorebook enrich`
#[derive(Args, Debug, Clone)]
pub struct EnrichArgs {
    /// Entity file (JSON) to enrich
    #[arg(long)]
    pub input: PathBuf,

    /// Where to write the enriched entities (JSON)
    #[arg(long)]
    pub output: PathBuf,

    /// File whose contents replace the default enrichment instructions
    #[arg(long)]
    pub prompt: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_arguments() {
        let cli = Cli::parse_from([
            "lorebook",
            "extract",
            "--input",
            "novel.txt",
            "--output",
            "bible.json",
            "--pace-ms",
            "0",
            "--chunk-size",
            "20000",
            "-v",
        ]);

        assert!(cli.verbose);
        match cli.command {
            Commands::Extract(args) => {
                assert_eq!(args.input, PathBuf::from("novel.txt"));
                assert_eq!(args.pace_ms, Some(0));
                assert_eq!(args.chunk_size, Some(20_000));
                assert!(args.seed.is_none());
            }
            Commands::Enrich(_) => panic!("Expected extract command"),
        }
    }

    #[test]
    fn test_enrich_requires_output() {
        assert!(Cli::try_parse_from(["lorebook", "enrich", "--input", "bible.json"]).is_err());
    }
}
