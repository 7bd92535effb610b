use crate::error::SpyError;
use axum::Router;
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;

/// Bind `addr` and serve `app` until SIGINT/SIGTERM.
pub async fn serve(app: Router, addr: SocketAddr) -> Result<(), SpyError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| SpyError::Bind {
            address: addr,
            source,
        })?;
    let local_addr = listener.local_addr().map_err(SpyError::Listener)?;
    info!("Starting OTLP/HTTP spy on {local_addr}");
    info!("  - GET  /v1/health     (health check)");
    info!("  - POST /v1/logs       (OTLP logs)");
    info!("  - POST /v1/traces     (OTLP traces)");
    info!("  - POST /v1/metrics    (OTLP metrics)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(SpyError::Listener)?;

    info!("Spy stopped, all in-flight exchanges answered");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM. Exchanges already accepted run to completion,
/// including their upstream call and diagnostic flush.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, no longer accepting OTLP exports"),
        () = terminate => info!("Received SIGTERM, no longer accepting OTLP exports"),
    }
}
