//! Downstream service clients.
//!
//! Each client performs exactly one HTTP POST per call against a single
//! collaborator and interprets the reply. All clients share one
//! [`HttpTransport`], which wraps a process-wide `reqwest::Client` that is
//! never mutated after construction.

pub mod auth;
pub mod log;
pub mod mail;

pub use auth::AuthClient;
pub use log::LogClient;
pub use mail::MailClient;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use http::header::CONTENT_TYPE;
use http::StatusCode;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::{ServicesConfig, DEFAULT_MAX_RESPONSE_BYTES};
use crate::envelope::ResponseEnvelope;
use crate::error::{DispatchError, Result};

/// JSON content type, set by clients whose collaborator requires it.
pub const APPLICATION_JSON: &str = "application/json";

/// A downstream reply whose body has been read to completion.
///
/// The underlying `reqwest::Response` is consumed while building this value,
/// so the connection is already released by the time a client inspects it.
#[derive(Debug, Clone)]
pub struct DownstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl DownstreamResponse {
    /// Create a response from a status and body.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true if the collaborator answered 202 Accepted.
    pub fn is_accepted(&self) -> bool {
        self.status == StatusCode::ACCEPTED
    }

    /// Decode the body as a response envelope.
    pub fn envelope(&self, service: &'static str) -> Result<ResponseEnvelope> {
        serde_json::from_slice(&self.body).map_err(|e| DispatchError::UpstreamFailure {
            service,
            reason: format!("invalid response body: {}", e),
        })
    }

    /// The `data` field of the body, or `None` when the body is empty.
    pub fn data(&self, service: &'static str) -> Result<Option<serde_json::Value>> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(self.envelope(service)?.data)
    }
}

/// Shared outbound HTTP transport.
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    max_response_bytes: usize,
}

impl HttpTransport {
    /// Build the transport with the configured deadlines.
    ///
    /// Every request is bounded by `timeout`; expiry surfaces as a
    /// [`DispatchError::TransportError`].
    pub fn new(config: &ServicesConfig) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;
        Ok(Self {
            client,
            max_response_bytes: config.max_response_bytes,
        })
    }

    /// Wrap an existing client.
    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }

    /// POST `body` to `url` and read the full reply.
    ///
    /// A reply body larger than the configured cap is an
    /// [`DispatchError::UpstreamFailure`].
    pub async fn post(
        &self,
        service: &'static str,
        url: &str,
        body: Vec<u8>,
        content_type: Option<&'static str>,
    ) -> Result<DownstreamResponse> {
        let transport_error = |source| DispatchError::TransportError { service, source };

        let mut request = self.client.post(url).body(body);
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }

        // The response is owned by this scope and dropped on every return path.
        let mut response = request.send().await.map_err(transport_error)?;
        let status = response.status();

        if response
            .content_length()
            .is_some_and(|len| len > self.max_response_bytes as u64)
        {
            return Err(self.oversized(service));
        }

        let mut buf = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(transport_error)? {
            if buf.len() + chunk.len() > self.max_response_bytes {
                return Err(self.oversized(service));
            }
            buf.extend_from_slice(&chunk);
        }
        let body = buf.freeze();

        debug!(service, url, status = %status, bytes = body.len(), "downstream replied");
        Ok(DownstreamResponse { status, body })
    }

    fn oversized(&self, service: &'static str) -> DispatchError {
        DispatchError::UpstreamFailure {
            service,
            reason: format!("response body exceeds {} bytes", self.max_response_bytes),
        }
    }
}

/// A client for one downstream collaborator.
///
/// Implementors describe where and how to send; [`ServiceClient::call`]
/// performs the single outbound request.
#[async_trait]
pub trait ServiceClient: Send + Sync {
    /// Payload forwarded to the collaborator.
    type Payload: Serialize + Send + Sync;

    /// Service name for logging and error messages.
    fn name(&self) -> &'static str;

    /// Full URL the payload is posted to.
    fn url(&self) -> &str;

    /// Explicit `Content-Type` header, if this collaborator needs one.
    fn content_type(&self) -> Option<&'static str> {
        None
    }

    fn transport(&self) -> &HttpTransport;

    /// Serialize the payload into the outbound body.
    fn build_body(&self, payload: &Self::Payload) -> Result<Vec<u8>> {
        serde_json::to_vec(payload).map_err(|e| DispatchError::MalformedRequest(e.to_string()))
    }

    /// Map the collaborator's reply into the broker's response.
    fn interpret(
        &self,
        payload: &Self::Payload,
        response: DownstreamResponse,
    ) -> Result<ResponseEnvelope>;

    /// Send the payload and interpret the reply. No retries.
    async fn call(&self, payload: &Self::Payload) -> Result<ResponseEnvelope> {
        let body = self.build_body(payload)?;
        let response = self
            .transport()
            .post(self.name(), self.url(), body, self.content_type())
            .await?;
        self.interpret(payload, response)
    }
}
