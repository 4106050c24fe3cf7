//! FinSight Core Library
//!
//! Shared functionality for the FinSight expense intelligence tool:
//! - Report data model and structured output schema
//! - Report requestor (grounded, schema-constrained analysis calls)
//! - Pluggable AI backends (Gemini, mock)
//! - Analysis session holding the report on display
//! - Prompt library for customizable AI prompts
//! - Analysis settings (embedded defaults + data-dir override)

pub mod ai;
pub mod analysis;
pub mod demo;
pub mod error;
pub mod models;
pub mod prompts;
pub mod schema;
pub mod session;
pub mod settings;

/// Test utilities including mock Gemini server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIBackend, AIClient, GeminiBackend, GenerateRequest, GenerateResponse, GroundingChunk,
    GroundingMetadata, MockBackend,
};
pub use analysis::ReportRequestor;
pub use error::{Error, Result};
pub use models::{
    AnalysisReport, CategorySummary, ExpenseRecord, GroundingSource, MonthlyTrend, Predictions,
    ReportPayload, TrendDirection,
};
pub use prompts::{Prompt, PromptId, PromptLibrary};
pub use session::{AnalysisSession, CurrentReport, SessionStatus};
pub use settings::AnalysisSettings;
