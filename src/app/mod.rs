mod router;
pub mod server;
mod state;
pub mod tracing;

pub use router::router;
pub use state::AppState;

use crate::config;
use crate::endpoint::ResolvedEndpoints;
use crate::error::SpyError;

/// Application entry point. Initializes tracing, configuration, and starts the server.
pub async fn run() -> Result<(), SpyError> {
    // Handle healthcheck subcommand (for Docker healthcheck in distroless image)
    if std::env::args().nth(1).as_deref() == Some("healthcheck") {
        match crate::healthcheck().await {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("Healthcheck failed: {e}");
                std::process::exit(1)
            }
        }
    }

    tracing::init_tracing();

    let settings = config::get_configuration()?;
    ::tracing::info!("Loaded settings");

    let app_state = AppState::from_settings(&settings)?;
    log_configured_endpoints(&app_state.endpoints);

    let app = router(app_state.otlp_state());
    server::serve(app, settings.listen_socket_addr()?).await
}

fn log_configured_endpoints(endpoints: &ResolvedEndpoints) {
    if endpoints.configured().next().is_none() {
        ::tracing::info!("[Proxy] No upstream configured, payloads are logged only");
        return;
    }
    for (signal, endpoint) in endpoints.configured() {
        ::tracing::info!("[Proxy] {signal} will be forwarded to => {endpoint}");
    }
}
