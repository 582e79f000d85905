//! Authentication service client.
//!
//! Posts credentials to `/authenticate`. Success needs both a 202 status and
//! an envelope with `error=false`; the status alone does not confirm that the
//! credentials were accepted.

use http::StatusCode;

use super::{DownstreamResponse, HttpTransport, ServiceClient};
use crate::config::ServiceEndpoint;
use crate::envelope::{AuthPayload, ResponseEnvelope};
use crate::error::{DispatchError, Result};

/// Path of the authentication endpoint.
pub const AUTH_PATH: &str = "/authenticate";
/// Message returned on successful authentication.
pub const AUTHENTICATED: &str = "Authenticated!";

/// Client for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthClient {
    transport: HttpTransport,
    url: String,
}

impl AuthClient {
    pub fn new(transport: HttpTransport, endpoint: &ServiceEndpoint) -> Self {
        Self {
            transport,
            url: endpoint.url(AUTH_PATH),
        }
    }
}

impl ServiceClient for AuthClient {
    type Payload = AuthPayload;

    fn name(&self) -> &'static str {
        "auth"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    fn interpret(
        &self,
        _payload: &AuthPayload,
        response: DownstreamResponse,
    ) -> Result<ResponseEnvelope> {
        match response.status {
            StatusCode::ACCEPTED => {}
            StatusCode::UNAUTHORIZED => return Err(DispatchError::InvalidCredentials),
            status => return Err(DispatchError::unexpected_status(self.name(), status)),
        }

        let downstream = response.envelope(self.name())?;
        if downstream.error {
            return Err(DispatchError::InvalidCredentials);
        }

        Ok(ResponseEnvelope::ok(AUTHENTICATED, downstream.data))
    }
}
