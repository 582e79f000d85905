//! Logger service client.

use super::{DownstreamResponse, HttpTransport, ServiceClient, APPLICATION_JSON};
use crate::config::ServiceEndpoint;
use crate::envelope::{LogPayload, ResponseEnvelope};
use crate::error::{DispatchError, Result};

/// Path of the log endpoint.
pub const LOG_PATH: &str = "/log";
/// Message returned once the entry is logged.
pub const LOGGED: &str = "Logged!";

/// Client for the logger service.
#[derive(Debug, Clone)]
pub struct LogClient {
    transport: HttpTransport,
    url: String,
}

impl LogClient {
    pub fn new(transport: HttpTransport, endpoint: &ServiceEndpoint) -> Self {
        Self {
            transport,
            url: endpoint.url(LOG_PATH),
        }
    }
}

impl ServiceClient for LogClient {
    type Payload = LogPayload;

    fn name(&self) -> &'static str {
        "log"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn content_type(&self) -> Option<&'static str> {
        Some(APPLICATION_JSON)
    }

    fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    // The downstream `error` flag is not consulted here, only in the auth client.
    fn interpret(
        &self,
        _payload: &LogPayload,
        response: DownstreamResponse,
    ) -> Result<ResponseEnvelope> {
        if !response.is_accepted() {
            return Err(DispatchError::unexpected_status(self.name(), response.status));
        }

        Ok(ResponseEnvelope::ok(LOGGED, response.data(self.name())?))
    }
}
