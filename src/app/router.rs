use crate::handler::health::health_handler;
use crate::handler::otlp::{OtlpState, otlp_routes};
use axum::Router;
use axum::routing::get;

/// Build the HTTP router (health + OTLP logs/traces/metrics).
pub fn router(state: OtlpState) -> Router {
    let v1_health_router = Router::new().route("/v1/health", get(health_handler));

    Router::new()
        .merge(v1_health_router)
        .merge(otlp_routes(state))
}
