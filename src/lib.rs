//! Broker - action dispatch service
//!
//! Receives tagged request envelopes over HTTP and routes each one to the
//! authentication, logger or mail service, normalizing every outcome into a
//! uniform `{error, message, data}` response.

pub mod clients;
pub mod config;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod utils;

pub use dispatcher::ActionDispatcher;
pub use envelope::{Action, RequestEnvelope, ResponseEnvelope};
pub use error::DispatchError;
