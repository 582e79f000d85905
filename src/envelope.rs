//! Request and response envelopes.
//!
//! Inbound requests carry an `action` tag plus a payload stored under a key
//! named after that tag:
//!
//! ```json
//! { "action": "mail", "mail": { "from": "...", "to": "...", "subject": "...", "message": "..." } }
//! ```
//!
//! Every response, from the broker and from downstream services alike, uses
//! the same `{error, message, data}` shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DispatchError;

/// Action tag for authentication requests.
pub const ACTION_AUTH: &str = "auth";
/// Action tag for log requests.
pub const ACTION_LOG: &str = "log";
/// Action tag for mail requests.
pub const ACTION_MAIL: &str = "mail";

/// Credentials forwarded verbatim to the authentication service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthPayload {
    pub email: String,
    pub password: String,
}

/// Log record forwarded verbatim to the logger service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogPayload {
    pub name: String,
    pub data: String,
}

/// Message forwarded verbatim to the mail service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailPayload {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub message: String,
}

/// Inbound request as it appears on the wire.
///
/// Only the payload matching `action` is consumed; the others are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<LogPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail: Option<MailPayload>,
}

impl RequestEnvelope {
    /// Decode a request body.
    ///
    /// Any body that is not a JSON object with a string `action` field is
    /// rejected as [`DispatchError::MalformedRequest`].
    pub fn from_slice(body: &[u8]) -> Result<Self, DispatchError> {
        serde_json::from_slice(body).map_err(|e| DispatchError::MalformedRequest(e.to_string()))
    }

    /// Resolve the `action` tag into a typed [`Action`].
    ///
    /// A known action with no payload forwards an empty payload.
    pub fn into_action(self) -> Result<Action, DispatchError> {
        match self.action.as_str() {
            ACTION_AUTH => Ok(Action::Auth(self.auth.unwrap_or_default())),
            ACTION_LOG => Ok(Action::Log(self.log.unwrap_or_default())),
            ACTION_MAIL => Ok(Action::Mail(self.mail.unwrap_or_default())),
            _ => Err(DispatchError::UnknownAction(self.action)),
        }
    }
}

/// A routable request: one variant per downstream service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Auth(AuthPayload),
    Log(LogPayload),
    Mail(MailPayload),
}

impl Action {
    /// The wire tag for this action.
    pub fn tag(&self) -> &'static str {
        match self {
            Action::Auth(_) => ACTION_AUTH,
            Action::Log(_) => ACTION_LOG,
            Action::Mail(_) => ACTION_MAIL,
        }
    }
}

impl From<Action> for RequestEnvelope {
    fn from(action: Action) -> Self {
        let mut envelope = RequestEnvelope {
            action: action.tag().to_string(),
            ..Default::default()
        };
        match action {
            Action::Auth(p) => envelope.auth = Some(p),
            Action::Log(p) => envelope.log = Some(p),
            Action::Mail(p) => envelope.mail = Some(p),
        }
        envelope
    }
}

/// Uniform `{error, message, data}` response body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResponseEnvelope {
    /// Successful response.
    pub fn ok(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            error: false,
            message: message.into(),
            data,
        }
    }

    /// Failed response with no data.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            data: None,
        }
    }
}
