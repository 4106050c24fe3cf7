//! Shared display state for one analysis workspace
//!
//! An [`AnalysisSession`] owns the "current report" a UI shows. Only one
//! analysis may be outstanding at a time; a second request while one is in
//! flight fails with [`Error::AnalysisInProgress`] instead of racing the
//! first to update the display.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::analysis::ReportRequestor;
use crate::error::{Error, Result};
use crate::models::AnalysisReport;

/// The report currently on display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentReport {
    pub report: AnalysisReport,
    pub analyzed_at: DateTime<Utc>,
    pub model: String,
}

/// Where the session is in the input -> analyzing -> report flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// No report, nothing running
    Idle,
    /// An analysis is outstanding
    Analyzing,
    /// A report is available
    Ready,
    /// The last analysis failed
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Analyzing => "analyzing",
            SessionStatus::Ready => "ready",
            SessionStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    current: Option<CurrentReport>,
    last_error: Option<String>,
    /// Bumped by `clear()`; a run only publishes if it is unchanged
    generation: u64,
}

/// Session holding at most one report and at most one running analysis
pub struct AnalysisSession {
    requestor: ReportRequestor,
    state: Mutex<SessionState>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the analysis future completes or is dropped
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl AnalysisSession {
    pub fn new(requestor: ReportRequestor) -> Self {
        Self {
            requestor,
            state: Mutex::new(SessionState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn requestor(&self) -> &ReportRequestor {
        &self.requestor
    }

    /// Run an analysis and make its outcome the session's display state
    ///
    /// Success replaces the current report wholesale. Any other failure
    /// clears it and records the error. Empty input and a rejected
    /// overlapping request leave the state untouched. If the session was
    /// cleared while the analysis ran, its outcome is returned to the caller
    /// but not shown.
    pub async fn run(&self, raw: &str) -> Result<AnalysisReport> {
        if raw.trim().is_empty() {
            return Err(Error::EmptyInput);
        }

        let _guard = self.begin()?;
        let generation = self.lock().generation;

        let result = self.requestor.analyze(raw).await;
        self.publish(generation, result)
    }

    /// Make a finished analysis the display state, unless the session was
    /// cleared since it started
    fn publish(
        &self,
        generation: u64,
        result: Result<AnalysisReport>,
    ) -> Result<AnalysisReport> {
        let mut state = self.lock();
        if state.generation != generation {
            info!("Session cleared during analysis, discarding outcome");
            return result;
        }

        match result {
            Ok(report) => {
                state.current = Some(CurrentReport {
                    report: report.clone(),
                    analyzed_at: Utc::now(),
                    model: self.requestor.model().to_string(),
                });
                state.last_error = None;
                Ok(report)
            }
            Err(e) => {
                state.current = None;
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// The report on display, if any
    pub fn current(&self) -> Option<CurrentReport> {
        self.lock().current.clone()
    }

    /// Message of the last failed analysis, if the last analysis failed
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Whether an analysis is outstanding
    pub fn is_analyzing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> SessionStatus {
        if self.is_analyzing() {
            return SessionStatus::Analyzing;
        }
        let state = self.lock();
        if state.current.is_some() {
            SessionStatus::Ready
        } else if state.last_error.is_some() {
            SessionStatus::Failed
        } else {
            SessionStatus::Idle
        }
    }

    /// Drop the current report and error ("New Analysis")
    pub fn clear(&self) {
        let mut state = self.lock();
        if state.current.is_some() {
            info!("Clearing current report");
        }
        let generation = state.generation.wrapping_add(1);
        *state = SessionState {
            generation,
            ..SessionState::default()
        };
    }

    fn begin(&self) -> Result<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| Error::AnalysisInProgress)?;
        Ok(InFlightGuard(&self.in_flight))
    }

    // State is plain data; a panic mid-update cannot leave it inconsistent
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
