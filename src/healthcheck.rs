use std::time::Duration;

use crate::config::Settings;

/// Error type for healthcheck failures
#[derive(Debug)]
pub struct HealthcheckError(String);

impl std::fmt::Display for HealthcheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Healthcheck failed: {}", self.0)
    }
}

impl std::error::Error for HealthcheckError {}

/// Perform a health check against the port the spy is configured to listen on
/// (`LISTEN_ADDR`, default 4318).
pub async fn healthcheck() -> Result<(), HealthcheckError> {
    let listen_addr =
        std::env::var("LISTEN_ADDR").unwrap_or_else(|_| Settings::default().listen_addr);
    let settings = Settings {
        listen_addr,
        ..Default::default()
    };
    let port = settings
        .listen_socket_addr()
        .map_err(|e| HealthcheckError(e.to_string()))?
        .port();
    healthcheck_with_port(port).await
}

/// Perform a health check against a specific port
pub async fn healthcheck_with_port(port: u16) -> Result<(), HealthcheckError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .map_err(|e| HealthcheckError(format!("Failed to create HTTP client: {e}")))?;

    let url = format!("http://127.0.0.1:{port}/v1/health");

    let resp = client
        .get(&url)
        .send()
        .await
        .map_err(|e| HealthcheckError(format!("Request failed: {e}")))?;

    if resp.status().is_success() {
        Ok(())
    } else {
        Err(HealthcheckError(format!(
            "Health endpoint returned status: {}",
            resp.status()
        )))
    }
}
