//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the lorebook binary.

mod commands;
mod enrich;
mod extract;
mod files;

pub use commands::{Cli, Commands, EnrichArgs, ExtractArgs};
pub use enrich::run_enrich;
pub use extract::run_extract;
