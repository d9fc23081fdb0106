//! Multimodal model client.
//!
//! Sends a frame (or an uploaded file reference) plus an instruction to the
//! generateContent endpoint and returns the model's raw text reply. Output
//! format is constrained only by the prompt; validation happens downstream.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{InferenceError, InferenceResult};
use crate::metrics;

/// Default base URL of the model endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Model API client.
pub struct GeminiClient {
    api_key: String,
    client: Client,
    base_url: String,
    model: String,
    request_timeout: Duration,
}

/// One content part of a request.
#[derive(Debug, Clone, Serialize)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "fileData", skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize)]
struct FileData {
    #[serde(rename = "fileUri")]
    file_uri: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

#[derive(Debug, Clone, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    /// Base64-encoded image bytes
    data: String,
}

impl Part {
    /// Instruction text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            file_data: None,
            inline_data: None,
        }
    }

    /// Reference to a previously uploaded file.
    pub fn file(uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            text: None,
            file_data: Some(FileData {
                file_uri: uri.into(),
                mime_type: mime_type.into(),
            }),
            inline_data: None,
        }
    }

    /// Inline image bytes.
    pub fn inline_image(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            text: None,
            file_data: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: BASE64.encode(bytes),
            }),
        }
    }
}

/// Model API request.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Model API response. Every level of the candidate path may be absent.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
    #[serde(default, rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default, rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(default, rename = "blockReason")]
    block_reason: Option<String>,
}

/// Map a non-success upstream status to an error category.
pub fn classify_status(status: u16, body: String) -> InferenceError {
    match status {
        401 | 403 => InferenceError::Auth { status },
        429 => InferenceError::Quota,
        400 => InferenceError::BadRequest(body),
        _ => InferenceError::Upstream { status, body },
    }
}

impl GeminiClient {
    /// Create a new client against the production endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(120),
        }
    }

    /// Override the endpoint base URL (tests point this at a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Send media parts plus an instruction and return the raw text reply.
    pub async fn generate(&self, media: Vec<Part>, instruction: &str) -> InferenceResult<String> {
        let result = self.generate_inner(media, instruction).await;
        match &result {
            Ok(_) => metrics::record_request("ok"),
            Err(e) => metrics::record_request(e.category()),
        }
        result
    }

    async fn generate_inner(&self, media: Vec<Part>, instruction: &str) -> InferenceResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let mut parts = media;
        parts.push(Part::text(instruction));

        let request = GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Network(format!("Malformed model response: {}", e)))?;

        if let Some(feedback) = &parsed.prompt_feedback {
            if let Some(reason) = &feedback.block_reason {
                return Err(InferenceError::SafetyBlocked(reason.clone()));
            }
        }

        let candidate = parsed
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .ok_or(InferenceError::NoCandidate)?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(InferenceError::SafetyBlocked(
                "candidate stopped by safety filter".to_string(),
            ));
        }

        let text = candidate
            .content
            .as_ref()
            .and_then(|c| c.parts.as_ref())
            .and_then(|p| p.first())
            .and_then(|p| p.text.as_deref())
            .ok_or(InferenceError::NoCandidate)?;

        debug!("Model returned {} chars of text", text.len());
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(401, String::new()),
            InferenceError::Auth { status: 401 }
        ));
        assert!(matches!(
            classify_status(403, String::new()),
            InferenceError::Auth { status: 403 }
        ));
        assert!(matches!(classify_status(429, String::new()), InferenceError::Quota));
        assert!(matches!(
            classify_status(400, String::new()),
            InferenceError::BadRequest(_)
        ));
        assert!(matches!(
            classify_status(503, String::new()),
            InferenceError::Upstream { status: 503, .. }
        ));
    }

    #[test]
    fn test_part_serialization_shapes() {
        let text = serde_json::to_value(Part::text("hi")).unwrap();
        assert_eq!(text, serde_json::json!({"text": "hi"}));

        let file = serde_json::to_value(Part::file("files/x", "video/mp4")).unwrap();
        assert_eq!(
            file,
            serde_json::json!({"fileData": {"fileUri": "files/x", "mimeType": "video/mp4"}})
        );

        let inline = serde_json::to_value(Part::inline_image(b"ab", "image/jpeg")).unwrap();
        assert_eq!(
            inline,
            serde_json::json!({"inlineData": {"mimeType": "image/jpeg", "data": "YWI="}})
        );
    }
}
