//! Per-signal upstream address resolution.
//!
//! An explicit per-signal address always wins; otherwise the signal's fixed
//! path is appended to the base endpoint. With neither, forwarding is off for
//! that signal. Addresses are not validated here: a malformed one surfaces
//! later as a transport error when forwarding.

use crate::config::Settings;
use crate::domain::SignalType;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedEndpoints {
    logs: Option<String>,
    traces: Option<String>,
    metrics: Option<String>,
}

impl ResolvedEndpoints {
    pub fn resolve(
        base: Option<&str>,
        logs: Option<&str>,
        traces: Option<&str>,
        metrics: Option<&str>,
    ) -> Self {
        Self {
            logs: resolve_one(SignalType::Logs, logs, base),
            traces: resolve_one(SignalType::Traces, traces, base),
            metrics: resolve_one(SignalType::Metrics, metrics, base),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::resolve(
            settings.endpoint.as_deref(),
            settings.logs_endpoint.as_deref(),
            settings.traces_endpoint.as_deref(),
            settings.metrics_endpoint.as_deref(),
        )
    }

    /// Upstream address for `signal`, or `None` when forwarding is disabled.
    pub fn for_signal(&self, signal: SignalType) -> Option<&str> {
        match signal {
            SignalType::Logs => self.logs.as_deref(),
            SignalType::Traces => self.traces.as_deref(),
            SignalType::Metrics => self.metrics.as_deref(),
        }
    }

    /// Signals with forwarding enabled, paired with their upstream address.
    pub fn configured(&self) -> impl Iterator<Item = (SignalType, &str)> + '_ {
        SignalType::ALL
            .into_iter()
            .filter_map(|signal| self.for_signal(signal).map(|endpoint| (signal, endpoint)))
    }
}

fn resolve_one(signal: SignalType, explicit: Option<&str>, base: Option<&str>) -> Option<String> {
    fn non_empty(value: Option<&str>) -> Option<&str> {
        value.filter(|v| !v.is_empty())
    }

    if let Some(explicit) = non_empty(explicit) {
        return Some(explicit.to_string());
    }
    non_empty(base).map(|base| format!("{base}{}", signal.path()))
}
