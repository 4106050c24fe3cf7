//! Report requestor
//!
//! Turns raw expense text into an [`AnalysisReport`] with one grounded,
//! schema-constrained generation call:
//!
//! 1. Reject empty input locally
//! 2. Render the `analyze_expenses` prompt around the raw text
//! 3. Send it with the report schema and search grounding enabled
//! 4. Decode the payload and attach the web citations

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::ai::parsing::{extract_sources, parse_report};
use crate::ai::{AIBackend, AIClient, GenerateRequest};
use crate::error::{Error, Result};
use crate::models::AnalysisReport;
use crate::prompts::{PromptId, PromptLibrary, EXPENSES_VAR};
use crate::schema::analysis_schema;
use crate::settings::AnalysisSettings;

/// Issues analysis requests against an AI backend
///
/// Stateless apart from the prompt cache; clones share the same client and
/// prompt library, and concurrent `analyze` calls are independent.
#[derive(Clone)]
pub struct ReportRequestor {
    client: AIClient,
    settings: AnalysisSettings,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl ReportRequestor {
    pub fn new(client: AIClient, settings: AnalysisSettings) -> Self {
        Self {
            client,
            settings,
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
        }
    }

    /// Use a specific prompt library instead of the default one
    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = Arc::new(RwLock::new(prompts));
        self
    }

    pub fn client(&self) -> &AIClient {
        &self.client
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Model the requests go to
    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Build the generation request for the given raw text
    pub fn build_request(&self, raw: &str) -> Result<GenerateRequest> {
        let prompt = {
            let mut prompts = self
                .prompts
                .write()
                .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
            let template = prompts.get(PromptId::AnalyzeExpenses)?;
            let mut vars = HashMap::new();
            vars.insert(EXPENSES_VAR, raw);
            template.render_user(&vars)
        };

        Ok(GenerateRequest {
            prompt,
            response_schema: Some(analysis_schema()),
            temperature: self.settings.temperature,
            web_search: self.settings.web_search,
        })
    }

    /// Analyze raw expense text
    ///
    /// Empty or whitespace-only input fails with [`Error::EmptyInput`]
    /// without contacting the backend, as does a prompt override that
    /// would leave the text out. Otherwise exactly one generation call is
    /// made; there are no retries.
    pub async fn analyze(&self, raw: &str) -> Result<AnalysisReport> {
        if raw.trim().is_empty() {
            return Err(Error::EmptyInput);
        }

        let input_id = fingerprint(raw);
        let request = self.build_request(raw)?;

        debug!(
            input = %input_id,
            input_lines = raw.lines().count(),
            model = %self.client.model(),
            "Requesting expense analysis"
        );

        let response = match self.client.generate(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(input = %input_id, error = %e, "Analysis request failed");
                return Err(e);
            }
        };

        let payload = parse_report(response.text.as_deref()).map_err(|e| {
            warn!(
                input = %input_id,
                finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
                error = %e,
                "Failed to decode analysis report"
            );
            e
        })?;

        let sources = response
            .grounding
            .as_ref()
            .map(extract_sources)
            .unwrap_or_default();

        let report = AnalysisReport::from_payload(payload, sources);

        info!(
            input = %input_id,
            records = report.categorization_summary.len(),
            categories = report.top_categories.len(),
            trends = report.monthly_trends.len(),
            sources = report.grounding_sources.len(),
            "Expense analysis complete"
        );

        Ok(report)
    }
}

/// Short SHA-256 fingerprint identifying input text in logs
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{GroundingChunk, MockBackend, MOCK_REPORT_JSON};
    use crate::models::{ReportPayload, TrendDirection};
    use crate::test_utils::{error_body, generate_content_body, MockGeminiServer};
    use axum::http::StatusCode;
    use serde_json::json;

    fn requestor(client: AIClient) -> ReportRequestor {
        ReportRequestor::new(client, AnalysisSettings::default())
            .with_prompts(PromptLibrary::embedded_only())
    }

    fn gemini(server: &MockGeminiServer) -> AIClient {
        AIClient::gemini(&server.url(), "gemini-test", Some("test-key"))
    }

    #[test]
    fn test_fingerprint() {
        let a = fingerprint("2024-01-01,Coffee,5.00");
        assert_eq!(a.len(), 12);
        assert_eq!(a, fingerprint("2024-01-01,Coffee,5.00"));
        assert_ne!(a, fingerprint("2024-01-02,Coffee,5.00"));
    }

    #[test]
    fn test_build_request() {
        let requestor = requestor(AIClient::mock());
        let request = requestor.build_request("2024-01-01,Coffee,5.00").unwrap();

        assert!(request.prompt.contains("DATA:\n2024-01-01,Coffee,5.00"));
        assert!(request.prompt.contains("Do not invent transactions"));
        assert!(!request.prompt.contains("{{expenses}}"));
        assert!(request.web_search);
        assert_eq!(request.temperature, 0.1);
        assert_eq!(request.response_schema, Some(analysis_schema()));
    }

    #[test]
    fn test_build_request_embeds_text_verbatim() {
        let requestor = requestor(AIClient::mock());
        let raw = "Date,Description\n2024-01-01,{{expenses}} & \"Café\"\n";
        let request = requestor.build_request(raw).unwrap();
        assert!(request.prompt.contains(raw.trim_end()));
    }

    #[test]
    fn test_build_request_respects_settings() {
        let settings = AnalysisSettings {
            temperature: 0.4,
            web_search: false,
            ..AnalysisSettings::default()
        };
        let requestor = ReportRequestor::new(AIClient::mock(), settings)
            .with_prompts(PromptLibrary::embedded_only());
        let request = requestor.build_request("x").unwrap();
        assert_eq!(request.temperature, 0.4);
        assert!(!request.web_search);
    }

    #[tokio::test]
    async fn test_empty_input_never_calls_backend() {
        let mock = MockBackend::new();
        let requestor = requestor(AIClient::Mock(mock.clone()));

        for raw in ["", "   ", "\n\t  \n"] {
            let err = requestor.analyze(raw).await.unwrap_err();
            assert!(matches!(err, Error::EmptyInput));
        }
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_override_without_placeholder_never_calls_backend() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("analyze_expenses.md"),
            "---\nid: analyze_expenses\nversion: 2\ntask_type: custom\n---\n\n# User\nAnalyze my spending.\n",
        )
        .unwrap();

        let mock = MockBackend::new();
        let requestor = ReportRequestor::new(AIClient::Mock(mock.clone()), AnalysisSettings::default())
            .with_prompts(PromptLibrary::with_override_dir(dir.path().to_path_buf()));

        let err = requestor.analyze("2024-01-01,Coffee,5.00").await.unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
        assert!(!err.is_analysis_failure());
        assert_eq!(mock.call_count(), 0);
        assert!(mock.last_request().is_none());
    }

    #[tokio::test]
    async fn test_analyze_with_mock_backend() {
        let mock = MockBackend::new();
        let requestor = requestor(AIClient::Mock(mock.clone()));

        let report = requestor.analyze("2024-01-01,Coffee,5.00").await.unwrap();
        assert_eq!(report.categorization_summary[0].description, "Coffee");
        assert!(report.grounding_sources.is_empty());
        assert_eq!(mock.call_count(), 1);
        let request = mock.last_request().unwrap();
        assert!(request.prompt.contains("2024-01-01,Coffee,5.00"));
    }

    #[tokio::test]
    async fn test_analyze_against_mock_server() {
        let server = MockGeminiServer::start().await;
        let requestor = requestor(gemini(&server));

        let report = requestor.analyze("2024-01-01,Coffee,5.00").await.unwrap();

        let payload: ReportPayload = serde_json::from_str(MOCK_REPORT_JSON).unwrap();
        assert_eq!(report, AnalysisReport::from_payload(payload, vec![]));

        assert_eq!(server.call_count(), 1);
        let body = server.last_request().unwrap();
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("2024-01-01,Coffee,5.00"));
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"],
            json!(crate::schema::REQUIRED_REPORT_FIELDS)
        );
    }

    #[tokio::test]
    async fn test_analyze_collects_grounding_sources() {
        let body = generate_content_body(
            MOCK_REPORT_JSON,
            &[
                GroundingChunk::web("https://example.com", "Example"),
                GroundingChunk::default(),
            ],
        );
        let server = MockGeminiServer::start_with(StatusCode::OK, body).await;
        let requestor = requestor(gemini(&server));

        let report = requestor.analyze("2024-01-01,Coffee,5.00").await.unwrap();
        assert_eq!(report.grounding_sources.len(), 1);
        assert_eq!(report.grounding_sources[0].title, "Example");
        assert_eq!(report.grounding_sources[0].uri, "https://example.com");
    }

    #[tokio::test]
    async fn test_analyze_trend_labels() {
        let text = MOCK_REPORT_JSON.replace(
            r#""monthlyTrends": []"#,
            r#""monthlyTrends": [{"month": "Feb", "change": "+12%", "trend": "rising"}]"#,
        );
        let server =
            MockGeminiServer::start_with(StatusCode::OK, generate_content_body(&text, &[])).await;
        let requestor = requestor(gemini(&server));

        let report = requestor.analyze("2024-02-01,Rent,1200").await.unwrap();
        assert_eq!(report.monthly_trends[0].trend, TrendDirection::Rising);
    }

    #[tokio::test]
    async fn test_analyze_provider_error() {
        let server = MockGeminiServer::start_with(
            StatusCode::TOO_MANY_REQUESTS,
            error_body(429, "Resource has been exhausted", "RESOURCE_EXHAUSTED"),
        )
        .await;
        let requestor = requestor(gemini(&server));

        let err = requestor.analyze("2024-01-01,Coffee,5.00").await.unwrap_err();
        assert!(matches!(err, Error::Provider { status: 429, .. }));
        assert!(err.is_analysis_failure());
        assert_eq!(server.call_count(), 1);
    }

    #[tokio::test]
    async fn test_analyze_empty_body_is_decode_failure() {
        let server = MockGeminiServer::start_with(StatusCode::OK, json!({"candidates": []})).await;
        let requestor = requestor(gemini(&server));

        let err = requestor.analyze("2024-01-01,Coffee,5.00").await.unwrap_err();
        assert!(matches!(err, Error::EmptyResponse));
        assert!(err.is_decode());
    }

    #[tokio::test]
    async fn test_analyze_missing_field_is_decode_failure() {
        let text = MOCK_REPORT_JSON.replace(r#""recommendations": []"#, r#""extra": []"#);
        let server =
            MockGeminiServer::start_with(StatusCode::OK, generate_content_body(&text, &[])).await;
        let requestor = requestor(gemini(&server));

        let err = requestor.analyze("2024-01-01,Coffee,5.00").await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert_eq!(server.call_count(), 1);
    }

    #[tokio::test]
    async fn test_analyze_unreachable_backend() {
        let requestor = requestor(AIClient::gemini("http://127.0.0.1:1", "gemini-test", None));
        let err = requestor.analyze("2024-01-01,Coffee,5.00").await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
        assert!(err.is_analysis_failure());
    }
}
