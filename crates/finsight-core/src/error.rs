//! Error types for FinSight

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No expense data provided")]
    EmptyInput,

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider error {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Provider returned an empty response")]
    EmptyResponse,

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("An analysis is already in progress")]
    AnalysisInProgress,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Transport, provider and decode failures.
    ///
    /// These are the cases a user sees as a single "analysis failed" outcome.
    pub fn is_analysis_failure(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Provider { .. } | Error::EmptyResponse | Error::Decode(_)
        )
    }

    /// Decode failures only (empty body, malformed JSON, shape mismatch)
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::EmptyResponse | Error::Decode(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
