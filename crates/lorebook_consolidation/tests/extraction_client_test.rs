//! Extraction client behavior against a scripted driver.

mod test_utils;

use lorebook_consolidation::{
    ConsolidationOptions, Consolidator, DEFAULT_EXTRACTION_PROMPT, ExtractionClient,
};
use lorebook_core::{Character, EntitySet, Scene};
use lorebook_error::{ExtractionErrorKind, LorebookErrorKind};
use lorebook_rate_limit::RetryPolicy;
use serde_json::json;
use std::time::Duration;
use test_utils::{MockDriver, MockResponse};

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(10), Duration::ZERO)
}

#[tokio::test(start_paused = true)]
async fn test_recovers_after_transient_failures() -> anyhow::Result<()> {
    let mock = MockDriver::new_sequence(vec![
        MockResponse::status(503, "UNAVAILABLE"),
        MockResponse::status(429, "Too Many Requests"),
        MockResponse::Success(
            "```json\n{\"characters\": [{\"name\": \"Lin\"}], \"scenes\": []}\n```".to_string(),
        ),
    ]);
    let client = ExtractionClient::new(mock.clone()).with_retry_policy(fast_retry());

    let reply = client
        .extract(DEFAULT_EXTRACTION_PROMPT, "", "Lin ran.")
        .await?;

    assert_eq!(mock.call_count(), 3);
    assert_eq!(reply.payload.characters[0].name, "Lin");
    assert!(reply.raw.starts_with("```json"));
    Ok(())
}

#[tokio::test]
async fn test_requests_carry_the_response_schema() -> anyhow::Result<()> {
    let mock = MockDriver::new_success(r#"{"characters": [], "scenes": []}"#);
    let client = ExtractionClient::new(mock.clone()).with_temperature(Some(0.2));

    client.extract("Rules.", "- group: A", "Chunk text.").await?;

    let request = &mock.requests()[0];
    let schema = request.response_schema().clone().unwrap_or_default();
    assert!(schema["properties"]["characters"].is_object());
    assert_eq!(*request.temperature(), Some(0.2));
    assert!(mock.prompt(0).ends_with("Chunk text."));
    Ok(())
}

#[tokio::test]
async fn test_blank_reply_is_an_empty_response_error() -> anyhow::Result<()> {
    let mock = MockDriver::new_success("   ");
    let client = ExtractionClient::new(mock.clone());

    let err = client.extract_raw("Rules.", "", "Chunk.").await.unwrap_err();

    assert!(matches!(
        err.kind(),
        LorebookErrorKind::Extraction(e) if e.kind == ExtractionErrorKind::EmptyResponse
    ));
    assert_eq!(mock.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_merge_keeps_identity_of_existing_record() -> anyhow::Result<()> {
    let mock = MockDriver::new_success(
        json!({"groupName": "Other", "name": "Other", "aliases": ["Lin'er"]}).to_string(),
    );
    let client = ExtractionClient::new(mock.clone());
    let existing = Character {
        id: "c1".to_string(),
        group_name: "Lin".to_string(),
        name: "Lin".to_string(),
        ..Default::default()
    };

    let merged = client.merge_characters(&existing, &existing.clone()).await?;

    assert_eq!(merged.id, "c1");
    assert_eq!(merged.name, "Lin");
    assert_eq!(merged.aliases, vec!["Lin'er".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_enrichment_skips_call_when_nothing_is_sparse() -> anyhow::Result<()> {
    let mock = MockDriver::new_success("{}");
    let consolidator = Consolidator::new(mock.clone(), ConsolidationOptions::default());
    let detailed = Scene {
        group_name: "Inn".to_string(),
        name: "Inn".to_string(),
        description: "A low timber hall with a fire pit and long benches.".to_string(),
        atmosphere: "Smoky and loud".to_string(),
        ..Default::default()
    };
    let input = EntitySet::new(vec![], vec![detailed]);

    let result = consolidator.run_enrichment(input.clone(), None).await?;

    assert_eq!(result, input);
    assert_eq!(mock.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_enrichment_uses_prompt_override() -> anyhow::Result<()> {
    let mock = MockDriver::new_success(
        json!({"scenes": [{"groupName": "Inn", "name": "Inn", "atmosphere": "Smoky"}]})
            .to_string(),
    );
    let consolidator = Consolidator::new(mock.clone(), ConsolidationOptions::default());
    let thin = Scene {
        group_name: "Inn".to_string(),
        name: "Inn".to_string(),
        ..Default::default()
    };

    let result = consolidator
        .run_enrichment(EntitySet::new(vec![], vec![thin]), Some("Describe the inn."))
        .await?;

    assert!(mock.prompt(0).starts_with("Describe the inn."));
    assert_eq!(result.scenes[0].atmosphere, "Smoky");
    Ok(())
}
