#![cfg(all(feature = "gemini", feature = "api"))]

// Live calls against the Gemini API. Run with:
// cargo test -p lorebook_models --features gemini,api

use lorebook_core::{GenerateRequest, Message, Role};
use lorebook_interface::LorebookDriver;
use lorebook_models::GeminiClient;
use serde_json::json;

#[tokio::test]
async fn test_structured_reply_is_json() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let client = GeminiClient::new()?;

    let request = GenerateRequest::builder()
        .messages(vec![Message::new(
            Role::User,
            "List the characters in: 'Mara handed Tobin the lantern.'",
        )])
        .response_schema(Some(json!({
            "type": "OBJECT",
            "properties": {
                "characters": {"type": "ARRAY", "items": {"type": "STRING"}}
            }
        })))
        .build()?;

    let response = client.generate(&request).await?;
    let value: serde_json::Value = serde_json::from_str(&response.text())?;
    assert!(value["characters"].is_array());
    Ok(())
}
