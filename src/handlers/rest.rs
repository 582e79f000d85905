//! REST API of the broker.
//!
//! Endpoints:
//! - `POST /` — ping, answers with a fixed envelope
//! - `POST /handle` — decode a request envelope and dispatch its action
//! - `GET /health` — health check
//!
//! Successful dispatches answer 202 Accepted. Failures answer with the status
//! of their [`DispatchError`] and an `error=true` envelope.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::dispatcher::ActionDispatcher;
use crate::envelope::{RequestEnvelope, ResponseEnvelope};
use crate::error::DispatchError;

/// Message returned by the ping endpoint.
pub const PING_MESSAGE: &str = "Hit the broker";
/// Largest inbound request body accepted by `/handle`.
pub const MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Shared state for axum handlers.
type AppState = Arc<ActionDispatcher>;

/// Start the REST server on `addr` and run until `signal` completes.
///
/// When the port is 0, the OS assigns an ephemeral port. The actual bound
/// port is always logged so it can be discovered.
pub async fn serve_with_shutdown<F>(
    dispatcher: Arc<ActionDispatcher>,
    addr: &str,
    signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(dispatcher);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual = listener.local_addr()?;
    info!(address = %actual, "broker REST API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await?;
    Ok(())
}

/// Build the axum router (separated for testing).
pub fn router(dispatcher: Arc<ActionDispatcher>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-csrf-token"),
        ])
        .expose_headers([header::LINK])
        .max_age(Duration::from_secs(300));

    Router::new()
        .route("/", post(ping))
        .route("/handle", post(handle))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn ping() -> Json<ResponseEnvelope> {
    Json(ResponseEnvelope::ok(PING_MESSAGE, None))
}

/// Decodes the body itself so that decoding failures, including an
/// oversized body, use the broker's envelope.
async fn handle(
    State(dispatcher): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<ResponseEnvelope>), DispatchError> {
    let body = body.map_err(|e| DispatchError::MalformedRequest(e.body_text()))?;
    let request = RequestEnvelope::from_slice(&body)?;
    let response = dispatcher.handle(request).await?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}
