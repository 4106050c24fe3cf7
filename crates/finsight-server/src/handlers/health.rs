//! Health handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use finsight_core::{AIBackend, SessionStatus};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: &'static str,
    pub model: String,
    /// Live reachability of the AI backend
    pub available: bool,
    pub session: SessionStatus,
}

/// GET /api/health - Server and AI backend status
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let client = state.session.requestor().client();

    Json(HealthResponse {
        status: "ok",
        backend: client.backend_name(),
        model: client.model().to_string(),
        available: client.health_check().await,
        session: state.session.status(),
    })
}
