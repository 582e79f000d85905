//! Dispatch failure taxonomy.
//!
//! Every failure the broker can produce is a [`DispatchError`]. Each variant
//! maps to one HTTP status and is rendered as an `error=true` envelope, so a
//! raw transport error never reaches the caller.

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use tracing::{error, warn};

use crate::envelope::ResponseEnvelope;

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Errors that can occur while dispatching an action.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Inbound body could not be decoded into a request envelope.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Action tag outside the known set.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// Authentication service rejected the credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Downstream service answered, but not with the expected outcome.
    #[error("error calling {service} service: {reason}")]
    UpstreamFailure {
        service: &'static str,
        reason: String,
    },

    /// Outbound call could not complete (connect, DNS, timeout).
    #[error("transport error calling {service} service: {source}")]
    TransportError {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl DispatchError {
    /// Upstream failure for an unexpected status code.
    pub fn unexpected_status(service: &'static str, status: StatusCode) -> Self {
        DispatchError::UpstreamFailure {
            service,
            reason: format!("unexpected status {}", status),
        }
    }

    /// HTTP status returned to the caller for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::MalformedRequest(_) | DispatchError::UnknownAction(_) => {
                StatusCode::BAD_REQUEST
            }
            DispatchError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            DispatchError::UpstreamFailure { .. } | DispatchError::TransportError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The `error=true` envelope describing this failure.
    pub fn envelope(&self) -> ResponseEnvelope {
        ResponseEnvelope::failure(self.to_string())
    }

    /// Returns true if the caller may reasonably try the same request again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DispatchError::UpstreamFailure { .. } | DispatchError::TransportError { .. }
        )
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(
                status = %status,
                retryable = self.is_retryable(),
                error = %self,
                "dispatch failed"
            );
        } else {
            warn!(status = %status, error = %self, "request rejected");
        }
        (status, Json(self.envelope())).into_response()
    }
}
