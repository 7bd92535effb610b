use crate::config::Settings;
use crate::endpoint::ResolvedEndpoints;
use crate::error::SpyError;
use crate::forwarder::Forwarder;
use crate::handler::otlp::OtlpState;
use crate::port::DiagnosticSink;
use crate::sink::TracingSink;
use std::sync::Arc;

/// Shared application state. Built once at startup and read-only afterwards.
pub struct AppState {
    pub endpoints: Arc<ResolvedEndpoints>,
    pub forwarder: Forwarder,
    pub sink: Arc<dyn DiagnosticSink>,
}

impl AppState {
    /// Create `AppState` from configuration settings.
    ///
    /// Resolves the per-signal upstream addresses and builds the upstream
    /// HTTP client with the configured timeout.
    pub fn from_settings(settings: &Settings) -> Result<Self, SpyError> {
        let forwarder = Forwarder::new(settings.forward_timeout()).map_err(SpyError::Client)?;

        Ok(Self {
            endpoints: Arc::new(ResolvedEndpoints::from_settings(settings)),
            forwarder,
            sink: Arc::new(TracingSink),
        })
    }

    pub fn otlp_state(&self) -> OtlpState {
        OtlpState {
            endpoints: self.endpoints.clone(),
            forwarder: self.forwarder.clone(),
            sink: self.sink.clone(),
        }
    }
}
