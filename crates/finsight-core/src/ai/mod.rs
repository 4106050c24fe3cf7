//! Pluggable AI backend abstraction
//!
//! # Architecture
//!
//! - `AIBackend` trait: one structured generation call plus health/identity
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (gemini, mock). Default: gemini
//! - `GEMINI_API_KEY` / `API_KEY`: Provider credential
//! - `GEMINI_MODEL`, `GEMINI_BASE_URL`: see [`crate::settings`]

mod gemini;
mod mock;
pub mod parsing;
pub mod types;

pub use gemini::GeminiBackend;
pub use mock::{MockBackend, MOCK_REPORT_JSON};
pub use types::*;

use async_trait::async_trait;

use crate::error::Result;
use crate::settings::AnalysisSettings;

/// Trait defining the interface for all AI backends
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Issue one generation request
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
#[derive(Clone)]
pub enum AIClient {
    /// Gemini generateContent API
    Gemini(GeminiBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND`:
    /// - `gemini` (default): Uses the settings plus `GEMINI_API_KEY`
    /// - `mock`: Canned responses, no network
    pub fn from_env(settings: &AnalysisSettings) -> Self {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "gemini".to_string());

        match backend.to_lowercase().as_str() {
            "gemini" | "google" => AIClient::Gemini(GeminiBackend::from_env(settings)),
            "mock" => AIClient::Mock(MockBackend::new()),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to gemini");
                AIClient::Gemini(GeminiBackend::from_env(settings))
            }
        }
    }

    /// Create a Gemini backend directly
    pub fn gemini(base_url: &str, model: &str, api_key: Option<&str>) -> Self {
        match api_key {
            Some(key) => AIClient::Gemini(GeminiBackend::with_api_key(base_url, model, key)),
            None => AIClient::Gemini(GeminiBackend::new(base_url, model)),
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Backend name for status output
    pub fn backend_name(&self) -> &'static str {
        match self {
            AIClient::Gemini(_) => "gemini",
            AIClient::Mock(_) => "mock",
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AIClient::Gemini(b) => AIClient::Gemini(b.with_model(model)),
            AIClient::Mock(b) => AIClient::Mock(b.with_model(model)),
        }
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        match self {
            AIClient::Gemini(b) => b.generate(request).await,
            AIClient::Mock(b) => b.generate(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Gemini(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_client_gemini() {
        let client = AIClient::gemini("http://localhost:8080", "gemini-test", Some("key"));
        assert_eq!(client.model(), "gemini-test");
        assert_eq!(client.host(), "http://localhost:8080");
        assert_eq!(client.backend_name(), "gemini");
    }

    #[test]
    fn test_ai_client_with_model() {
        let client = AIClient::mock().with_model("other");
        assert_eq!(client.model(), "other");
        assert_eq!(client.backend_name(), "mock");
    }

    #[tokio::test]
    async fn test_ai_client_mock_health() {
        assert!(AIClient::mock().health_check().await);
    }
}
