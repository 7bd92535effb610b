use tracing::debug;

/// GET /v1/health. Answers without touching any upstream collector, so a
/// down collector never marks the spy itself unhealthy.
pub async fn health_handler() -> &'static str {
    debug!("Health check requested");
    "Healthy"
}
