//! `lorebook extract` command handler.

use super::ExtractArgs;
use super::files::{read_json, read_prompt, read_text, write_json};
use lorebook::{
    ConsolidationOptions, Consolidator, EntitySet, GeminiClient, LorebookConfig, RunOptions,
    RunStatus,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Gemini driver configured from the `[gemini]` section.
pub(super) fn gemini_client(config: &LorebookConfig) -> anyhow::Result<GeminiClient> {
    Ok(GeminiClient::new()?
        .with_model(config.gemini.model.clone())
        .with_temperature(config.gemini.temperature))
}

/// Cancel `token` on Ctrl-C so the run stops after the in-flight chunk.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing the current chunk and writing partial results");
            token.cancel();
        }
    });
}

/// Run extraction over a text file and write the consolidated result.
///
/// Cancelled and aborted runs still write what was merged so far.
#[instrument(skip_all, fields(input = %args.input.display()))]
pub async fn run_extract(args: &ExtractArgs, config: &LorebookConfig) -> anyhow::Result<()> {
    let text = read_text(&args.input)?;

    let mut config = config.clone();
    if let Some(chunk_size) = args.chunk_size {
        config.consolidation.chunk_size = chunk_size;
    }

    let run = RunOptions {
        prompt_override: read_prompt(args.prompt.as_deref())?,
        enrichment_prompt: None,
        pace: args.pace_ms.map(Duration::from_millis),
        seed: args
            .seed
            .as_deref()
            .map(read_json::<EntitySet>)
            .transpose()?,
    };

    let consolidator = Consolidator::new(
        gemini_client(&config)?,
        ConsolidationOptions::from_config(&config),
    );

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let outcome = consolidator
        .run_extraction(
            &text,
            &run,
            |percent, status| info!(percent, "{}", status),
            &cancel,
        )
        .await?;

    write_json(&args.output, &outcome.entity_set())?;
    if let Some(path) = &args.debug_log {
        write_json(path, &outcome.debug_log)?;
    }

    println!(
        "{}: {} characters, {} scenes written to {}",
        outcome.status,
        outcome.characters.len(),
        outcome.scenes.len(),
        args.output.display()
    );

    match outcome.status {
        RunStatus::Errored => anyhow::bail!(
            "Run stopped early: {}",
            outcome.error.unwrap_or_else(|| "unknown error".to_string())
        ),
        RunStatus::Empty => {
            warn!("No characters or scenes were found; check the debug log");
            Ok(())
        }
        RunStatus::Completed | RunStatus::Cancelled => Ok(()),
    }
}
