//! FinSight Web Server
//!
//! Axum-based REST API behind the "paste or upload" analysis UI.
//!
//! Security features:
//! - Restrictive CORS policy
//! - Upload size limit
//! - Security headers (nosniff, frame deny, CSP)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use finsight_core::{AIBackend, AnalysisSession, ReportRequestor};

mod handlers;

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Message shown for any transport, provider or decode failure
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Analysis failed. Please ensure the data format is correct.";

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub session: AnalysisSession,
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(
    requestor: ReportRequestor,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> Router {
    let client = requestor.client();
    info!(
        "AI backend configured: {} ({}, model: {})",
        client.backend_name(),
        client.host(),
        client.model()
    );

    let state = Arc::new(AppState {
        session: AnalysisSession::new(requestor),
    });

    let api_routes = Router::new()
        // Analysis
        .route("/analyze", post(handlers::analyze))
        .route("/analyze/upload", post(handlers::analyze_upload))
        .route(
            "/report",
            get(handlers::get_report).delete(handlers::clear_report),
        )
        .route("/demo", get(handlers::get_demo))
        // Health
        .route("/health", get(handlers::health));

    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    };

    // CSP: restrict scripts to same-origin, allow inline styles (Tailwind)
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        // Multipart framing adds a little on top of the file itself
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 64 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    requestor: ReportRequestor,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    check_ai_connection(&requestor).await;

    let app = create_router(requestor, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(requestor: &ReportRequestor) {
    let client = requestor.client();
    if client.health_check().await {
        info!(
            "✅ AI backend connected: {} (model: {})",
            client.host(),
            client.model()
        );
    } else {
        warn!(
            "⚠️  AI backend not responding: {} (model: {})",
            client.host(),
            client.model()
        );
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn payload_too_large(msg: &str) -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            if self.status.is_server_error() {
                error!(status = %self.status, error = %err, "Request failed");
            }
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        let (status, message) = match err.downcast_ref::<finsight_core::Error>() {
            Some(finsight_core::Error::EmptyInput) => (
                StatusCode::BAD_REQUEST,
                "Please provide some expense data first.".to_string(),
            ),
            Some(finsight_core::Error::AnalysisInProgress) => (
                StatusCode::CONFLICT,
                "An analysis is already in progress".to_string(),
            ),
            Some(e) if e.is_analysis_failure() => {
                (StatusCode::BAD_GATEWAY, ANALYSIS_FAILED_MESSAGE.to_string())
            }
            // Return generic message to client
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred".to_string(),
            ),
        };

        Self {
            status,
            message,
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
