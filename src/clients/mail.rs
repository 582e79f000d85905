//! Mail service client.

use super::{DownstreamResponse, HttpTransport, ServiceClient, APPLICATION_JSON};
use crate::config::ServiceEndpoint;
use crate::envelope::{MailPayload, ResponseEnvelope};
use crate::error::{DispatchError, Result};

/// Path of the send endpoint.
pub const MAIL_PATH: &str = "/send";

/// Client for the mail service.
#[derive(Debug, Clone)]
pub struct MailClient {
    transport: HttpTransport,
    url: String,
}

impl MailClient {
    pub fn new(transport: HttpTransport, endpoint: &ServiceEndpoint) -> Self {
        Self {
            transport,
            url: endpoint.url(MAIL_PATH),
        }
    }
}

impl ServiceClient for MailClient {
    type Payload = MailPayload;

    fn name(&self) -> &'static str {
        "mail"
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

    /// The reply body is ignored; the confirmation names the recipient.
    fn interpret(
        &self,
        payload: &MailPayload,
        response: DownstreamResponse,
    ) -> Result<ResponseEnvelope> {
        if !response.is_accepted() {
            return Err(DispatchError::unexpected_status(self.name(), response.status));
        }

        Ok(ResponseEnvelope::ok(
            format!("Message sent to {}", payload.to),
            None,
        ))
    }
}
