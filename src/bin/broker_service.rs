//! broker-service: action broker
//!
//! Accepts `POST /handle` requests and forwards each to one downstream service.
//!
//! ## Architecture
//! ```text
//!                       +--> [authentication-service] POST /authenticate
//! [caller] --> [broker] +--> [logger-service]         POST /log
//!                       +--> [mail-service]           POST /send
//! ```
//!
//! ## Configuration
//! - BROKER_CONFIG: Path to a YAML config file (optional)
//! - BROKER__SERVER__PORT: Port for the REST API (default: 80)
//! - BROKER__SERVICES__<AUTH|LOG|MAIL>__BASE_URL: Downstream base URLs
//! - BROKER__SERVICES__TIMEOUT_MS: Deadline per outbound call (default: 10000)
//! - BROKER_LOG: Tracing filter (default: info)

use std::sync::Arc;

use tracing::info;

use broker::clients::HttpTransport;
use broker::config::Config;
use broker::handlers::rest::serve_with_shutdown;
use broker::utils::bootstrap::{init_tracing, shutdown_signal};
use broker::ActionDispatcher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();

    let config = Config::load(None).map_err(|e| e.to_string())?;

    let transport = HttpTransport::new(&config.services)?;
    let dispatcher = Arc::new(ActionDispatcher::from_config(transport, &config.services));

    info!(
        auth = %config.services.auth.base_url,
        log = %config.services.log.base_url,
        mail = %config.services.mail.base_url,
        timeout_ms = config.services.timeout_ms,
        "starting broker service"
    );

    serve_with_shutdown(dispatcher, &config.server.bind_address(), shutdown_signal()).await
}
