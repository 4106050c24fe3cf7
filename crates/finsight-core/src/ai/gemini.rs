//! Gemini backend implementation
//!
//! Talks to the `generateContent` endpoint of the Generative Language API.
//! Structured output is requested through `responseSchema`; search
//! augmentation through the `googleSearch` tool.
//!
//! # Configuration
//!
//! Environment variables:
//! - `GEMINI_API_KEY` (or `API_KEY`): API key sent as `x-goog-api-key`
//! - `GEMINI_MODEL`: Model name (default: gemini-3-flash-preview)
//! - `GEMINI_BASE_URL`: API root (default: https://generativelanguage.googleapis.com)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::settings::AnalysisSettings;

use super::types::{GenerateRequest, GenerateResponse, GroundingMetadata};
use super::AIBackend;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini backend
///
/// ```rust,ignore
/// export GEMINI_API_KEY="..."
/// export GEMINI_MODEL="gemini-3-flash-preview"
/// ```
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GeminiBackend {
    /// Create a new Gemini backend without an API key
    pub fn new(base_url: &str, model: &str) -> Self {
        Self::build(base_url, model, None, None)
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        Self::build(base_url, model, Some(api_key.to_string()), None)
    }

    /// Create from resolved settings and an optional key
    pub fn from_settings(settings: &AnalysisSettings, api_key: Option<String>) -> Self {
        Self::build(
            &settings.base_url,
            &settings.model,
            api_key,
            Some(settings.timeout),
        )
    }

    /// Create from environment variables on top of the given settings
    ///
    /// The key is read from `GEMINI_API_KEY`, then `API_KEY`. A missing key is
    /// not an error here; the provider rejects the call instead.
    pub fn from_env(settings: &AnalysisSettings) -> Self {
        let api_key = ["GEMINI_API_KEY", "API_KEY"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.is_empty());
        if api_key.is_none() {
            warn!("No GEMINI_API_KEY set; requests will be unauthenticated");
        }
        Self::from_settings(settings, api_key)
    }

    fn build(base_url: &str, model: &str, api_key: Option<String>, timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        // Builder only fails on TLS backend init; fall back to defaults
        let http_client = builder.build().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to build HTTP client, using defaults");
            Client::new()
        });

        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
            api_key: self.api_key.clone(),
        }
    }

    /// Whether an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn build_body(&self, request: &GenerateRequest) -> GenerateContentRequest {
        let tools = if request.web_search {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(request.prompt.clone()),
                }],
            }],
            tools,
            generation_config: GenerationConfig {
                response_mime_type: request
                    .response_schema
                    .as_ref()
                    .map(|_| "application/json".to_string()),
                response_schema: request.response_schema.clone(),
                temperature: Some(request.temperature),
            },
        }
    }
}

#[async_trait]
impl AIBackend for GeminiBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let body = self.build_body(request);

        debug!(
            model = %self.model,
            prompt_chars = request.prompt.len(),
            web_search = request.web_search,
            "Sending generateContent request"
        );

        let mut req_builder = self.http_client.post(self.endpoint()).json(&body);
        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header(API_KEY_HEADER, api_key);
        }

        let response = req_builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Provider {
                status: status.as_u16(),
                message: provider_message(&body),
            });
        }

        let raw = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&raw)
            .map_err(|e| Error::Decode(format!("Invalid generateContent envelope: {}", e)))?;

        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            warn!(block_reason = reason, "Prompt was blocked by the provider");
        }

        let Some(candidate) = parsed.candidates.into_iter().next() else {
            return Ok(GenerateResponse::default());
        };

        let text = candidate.content.and_then(|content| {
            let joined: String = content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect();
            (!joined.is_empty()).then_some(joined)
        });

        debug!(
            finish_reason = candidate.finish_reason.as_deref().unwrap_or("unknown"),
            grounded = candidate.grounding_metadata.is_some(),
            "Received generateContent response"
        );

        Ok(GenerateResponse {
            text,
            grounding: candidate.grounding_metadata,
            finish_reason: candidate.finish_reason,
        })
    }

    async fn health_check(&self) -> bool {
        let mut req_builder = self
            .http_client
            .get(format!("{}/v1beta/models/{}", self.base_url, self.model));
        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header(API_KEY_HEADER, api_key);
        }

        match req_builder.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

/// Pull `error.message` out of a provider error body, else the raw body
fn provider_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string())
}

// Wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}
