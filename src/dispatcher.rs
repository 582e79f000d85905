//! Action dispatcher.
//!
//! Routes a decoded request to exactly one downstream client, selected by an
//! exhaustive match over [`Action`]. Stateless apart from the immutable
//! clients, so a single instance is shared by all inbound requests.

use tracing::debug;

use crate::clients::{AuthClient, HttpTransport, LogClient, MailClient, ServiceClient};
use crate::config::ServicesConfig;
use crate::envelope::{Action, RequestEnvelope, ResponseEnvelope};
use crate::error::Result;

/// Dispatches actions to the authentication, logger and mail services.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    auth: AuthClient,
    log: LogClient,
    mail: MailClient,
}

impl ActionDispatcher {
    /// Create a dispatcher from already-built clients.
    pub fn new(auth: AuthClient, log: LogClient, mail: MailClient) -> Self {
        Self { auth, log, mail }
    }

    /// Build all clients over one shared transport.
    pub fn from_config(transport: HttpTransport, services: &ServicesConfig) -> Self {
        Self::new(
            AuthClient::new(transport.clone(), &services.auth),
            LogClient::new(transport.clone(), &services.log),
            MailClient::new(transport, &services.mail),
        )
    }

    /// Resolve the envelope's action and dispatch it.
    ///
    /// Unknown actions fail before any outbound call is made.
    pub async fn handle(&self, request: RequestEnvelope) -> Result<ResponseEnvelope> {
        let action = request.into_action()?;
        self.dispatch(action).await
    }

    /// Invoke the single client matching `action`.
    pub async fn dispatch(&self, action: Action) -> Result<ResponseEnvelope> {
        debug!(action = action.tag(), "dispatching");
        match action {
            Action::Auth(payload) => self.auth.call(&payload).await,
            Action::Log(payload) => self.log.call(&payload).await,
            Action::Mail(payload) => self.mail.call(&payload).await,
        }
    }
}
