//! AI backend request/response types
//!
//! These types are backend-agnostic and used across all AI implementations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single structured-output generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Fully rendered user prompt
    pub prompt: String,
    /// Structured output schema; when set the response must be JSON
    pub response_schema: Option<Value>,
    pub temperature: f32,
    /// Enable search augmentation (Google Search grounding)
    pub web_search: bool,
}

/// Result of a generation request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateResponse {
    /// Concatenated text parts of the first candidate
    pub text: Option<String>,
    /// Citation metadata, when the provider grounded its answer
    pub grounding: Option<GroundingMetadata>,
    /// Provider finish reason (STOP, MAX_TOKENS, SAFETY, ...)
    pub finish_reason: Option<String>,
}

/// Grounding metadata attached to a response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

/// One grounding chunk; only web citations are used
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<WebChunk>,
}

/// Web citation inside a grounding chunk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl GroundingChunk {
    /// Chunk carrying a web citation
    pub fn web(uri: &str, title: &str) -> Self {
        Self {
            web: Some(WebChunk {
                uri: Some(uri.to_string()),
                title: Some(title.to_string()),
            }),
        }
    }
}
