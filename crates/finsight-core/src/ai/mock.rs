//! Mock backend for testing
//!
//! Returns a canned, valid analysis report by default. Tests can swap in raw
//! response text, grounding chunks, or a provider failure, and inspect the
//! requests the backend received.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::types::{GenerateRequest, GenerateResponse, GroundingChunk, GroundingMetadata};
use super::AIBackend;

/// Canned single-transaction report
pub const MOCK_REPORT_JSON: &str = r#"{
  "categorizationSummary": [
    {"date": "2024-01-01", "description": "Coffee", "amount": 5.0, "category": "Dining"}
  ],
  "topCategories": [
    {"category": "Dining", "amount": 5.0, "percentage": 100}
  ],
  "recurringExpenses": [],
  "spendingSpikes": [],
  "monthlyTrends": [],
  "predictions": {"nextMonthTotal": 5.0, "highRiskCategories": [], "stableCategories": ["Dining"]},
  "keyInsights": [],
  "recommendations": []
}"#;

#[derive(Clone, Debug)]
enum MockOutcome {
    Respond {
        text: Option<String>,
        grounding: Option<GroundingMetadata>,
    },
    Fail {
        status: u16,
        message: String,
    },
}

/// Mock AI backend for testing
#[derive(Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    model: String,
    outcome: MockOutcome,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<GenerateRequest>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy, canned report, no grounding)
    pub fn new() -> Self {
        Self {
            healthy: true,
            model: "mock".to_string(),
            outcome: MockOutcome::Respond {
                text: Some(MOCK_REPORT_JSON.to_string()),
                grounding: None,
            },
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Respond with the given raw text instead of the canned report
    pub fn with_response(mut self, text: &str) -> Self {
        let grounding = match self.outcome {
            MockOutcome::Respond { grounding, .. } => grounding,
            MockOutcome::Fail { .. } => None,
        };
        self.outcome = MockOutcome::Respond {
            text: Some(text.to_string()),
            grounding,
        };
        self
    }

    /// Respond with no text at all
    pub fn with_empty_response(mut self) -> Self {
        self.outcome = MockOutcome::Respond {
            text: None,
            grounding: None,
        };
        self
    }

    /// Attach grounding chunks to the response
    pub fn with_grounding(mut self, chunks: Vec<GroundingChunk>) -> Self {
        let text = match self.outcome {
            MockOutcome::Respond { text, .. } => text,
            MockOutcome::Fail { .. } => Some(MOCK_REPORT_JSON.to_string()),
        };
        self.outcome = MockOutcome::Respond {
            text,
            grounding: Some(GroundingMetadata {
                grounding_chunks: chunks,
            }),
        };
        self
    }

    /// Fail every call with a provider error
    pub fn failing(mut self, status: u16, message: &str) -> Self {
        self.outcome = MockOutcome::Fail {
            status,
            message: message.to_string(),
        };
        self
    }

    /// Create a new instance with a different model
    ///
    /// Call counters and the recorded request stay shared.
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }

    /// Number of generate calls received
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        match &self.outcome {
            MockOutcome::Respond { text, grounding } => Ok(GenerateResponse {
                text: text.clone(),
                grounding: grounding.clone(),
                finish_reason: Some("STOP".to_string()),
            }),
            MockOutcome::Fail { status, message } => Err(Error::Provider {
                status: *status,
                message: message.clone(),
            }),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
