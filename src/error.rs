use std::net::SocketAddr;

use thiserror::Error;

/// Startup and listener failures. Per-call failures are `PipelineError`s and
/// never end the process.
#[derive(Error, Debug)]
pub enum SpyError {
    #[error("Failed to load configuration: {0}")]
    Config(String),

    #[error("Failed to bind OTLP/HTTP listener on {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build upstream HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("OTLP/HTTP listener stopped unexpectedly: {0}")]
    Listener(#[source] std::io::Error),
}
