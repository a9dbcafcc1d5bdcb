//! Conversions between Lorebook request types and Gemini wire types.

use super::GeminiResult;
use super::dto::{Content, GeminiRequest, GeminiResponse, GenerationConfig, Part};
use lorebook_core::{GenerateRequest, GenerateResponse, Output, Role};
use lorebook_error::{GeminiError, GeminiErrorKind};

/// Build the wire request. System messages become the system instruction.
pub fn to_gemini_request(req: &GenerateRequest, default_temperature: Option<f32>) -> GeminiRequest {
    let mut contents = Vec::new();
    let mut system_parts = Vec::new();

    for message in req.messages() {
        match message.role {
            Role::System => system_parts.push(Part::text(message.text.clone())),
            Role::User => contents.push(Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(message.text.clone())],
            }),
            Role::Assistant => contents.push(Content {
                role: Some("model".to_string()),
                parts: vec![Part::text(message.text.clone())],
            }),
        }
    }

    let system_instruction = (!system_parts.is_empty()).then(|| Content {
        role: None,
        parts: system_parts,
    });

    let generation_config = GenerationConfig {
        temperature: (*req.temperature()).or(default_temperature),
        max_output_tokens: *req.max_tokens(),
        response_mime_type: req
            .response_schema()
            .as_ref()
            .map(|_| "application/json".to_string()),
        response_schema: req.response_schema().clone(),
    };

    GeminiRequest {
        contents,
        system_instruction,
        generation_config: Some(generation_config),
    }
}

/// Pull the candidate text out of a response.
pub fn from_gemini_response(response: &GeminiResponse) -> GeminiResult<GenerateResponse> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.clone())
    {
        return Err(GeminiError::new(GeminiErrorKind::Blocked(reason)));
    }

    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| GeminiError::new(GeminiErrorKind::EmptyResponse))?;

    let text: String = candidate
        .content
        .iter()
        .flat_map(|content| content.parts.iter())
        .filter_map(|part| part.text.as_deref())
        .collect();

    if text.is_empty() {
        return match candidate.finish_reason.as_deref() {
            Some(reason @ ("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT")) => {
                Err(GeminiError::new(GeminiErrorKind::Blocked(reason.to_string())))
            }
            _ => Err(GeminiError::new(GeminiErrorKind::EmptyResponse)),
        };
    }

    Ok(GenerateResponse {
        outputs: vec![Output::Text(text)],
    })
}

/// Map a non-success status and its body to a Gemini error.
pub fn status_error(status_code: u16, body: String) -> GeminiError {
    GeminiError::new(GeminiErrorKind::HttpError {
        status_code,
        message: body,
    })
}
