//! `lorebook enrich` command handler.

use super::EnrichArgs;
use super::extract::gemini_client;
use super::files::{read_json, read_prompt, write_json};
use lorebook::{ConsolidationOptions, Consolidator, EntitySet, LorebookConfig};
use tracing::instrument;

/// Enrich the thin entries of an entity file.
#[instrument(skip_all, fields(input = %args.input.display()))]
pub async fn run_enrich(args: &EnrichArgs, config: &LorebookConfig) -> anyhow::Result<()> {
    let entities: EntitySet = read_json(&args.input)?;
    let prompt = read_prompt(args.prompt.as_deref())?;

    let consolidator = Consolidator::new(
        gemini_client(config)?,
        ConsolidationOptions::from_config(config),
    );
    let enriched = consolidator
        .run_enrichment(entities, prompt.as_deref())
        .await?;

    write_json(&args.output, &enriched)?;
    println!(
        "{} characters, {} scenes written to {}",
        enriched.characters.len(),
        enriched.scenes.len(),
        args.output.display()
    );
    Ok(())
}
