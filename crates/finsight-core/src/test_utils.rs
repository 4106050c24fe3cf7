//! Test utilities for finsight-core
//!
//! Provides a mock Gemini server that speaks just enough of the
//! `generateContent` API for end-to-end tests of the requestor.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::ai::{GroundingChunk, MOCK_REPORT_JSON};

#[derive(Debug)]
struct ServerState {
    status: StatusCode,
    body: Value,
    calls: usize,
    last_request: Option<Value>,
    last_api_key: Option<String>,
}

type SharedState = Arc<Mutex<ServerState>>;

/// Mock Gemini server for testing and development
pub struct MockGeminiServer {
    addr: SocketAddr,
    state: SharedState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockGeminiServer {
    /// Start the mock server returning the canned report without grounding
    pub async fn start() -> Self {
        Self::start_with(StatusCode::OK, generate_content_body(MOCK_REPORT_JSON, &[])).await
    }

    /// Start the mock server returning a fixed status and JSON body
    pub async fn start_with(status: StatusCode, body: Value) -> Self {
        let state = Arc::new(Mutex::new(ServerState {
            status,
            body,
            calls: 0,
            last_request: None,
            last_api_key: None,
        }));

        let app = Router::new()
            .route(
                "/v1beta/models/:target",
                get(handle_model).post(handle_generate),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of generateContent calls received
    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    /// Body of the most recent generateContent call
    pub fn last_request(&self) -> Option<Value> {
        self.state.lock().unwrap().last_request.clone()
    }

    /// API key header of the most recent generateContent call
    pub fn last_api_key(&self) -> Option<String> {
        self.state.lock().unwrap().last_api_key.clone()
    }

    /// Change the response served to subsequent calls
    pub fn respond_with(&self, status: StatusCode, body: Value) {
        let mut state = self.state.lock().unwrap();
        state.status = status;
        state.body = body;
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockGeminiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Build a `generateContent` response body around the given text
pub fn generate_content_body(text: &str, chunks: &[GroundingChunk]) -> Value {
    let mut candidate = json!({
        "content": {"role": "model", "parts": [{"text": text}]},
        "finishReason": "STOP",
        "index": 0
    });
    if !chunks.is_empty() {
        candidate["groundingMetadata"] = json!({
            "groundingChunks": chunks,
            "webSearchQueries": ["expense benchmarks"]
        });
    }
    json!({
        "candidates": [candidate],
        "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 80}
    })
}

/// Build a provider error body
pub fn error_body(code: u16, message: &str, status: &str) -> Value {
    json!({"error": {"code": code, "message": message, "status": status}})
}

/// Model metadata endpoint (health check)
async fn handle_model(Path(target): Path<String>) -> Json<Value> {
    Json(json!({
        "name": format!("models/{}", target),
        "displayName": target,
        "supportedGenerationMethods": ["generateContent"]
    }))
}

/// generateContent endpoint
async fn handle_generate(
    State(state): State<SharedState>,
    Path(target): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if !target.ends_with(":generateContent") {
        return (
            StatusCode::NOT_FOUND,
            Json(error_body(404, "Unknown method", "NOT_FOUND")),
        );
    }

    let mut state = state.lock().unwrap();
    state.calls += 1;
    state.last_request = Some(body);
    state.last_api_key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    (state.status, Json(state.body.clone()))
}
