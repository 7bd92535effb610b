use std::fmt;

/// The three telemetry categories carried by OTLP/HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalType {
    Logs,
    Traces,
    Metrics,
}

impl SignalType {
    pub const ALL: [SignalType; 3] = [SignalType::Logs, SignalType::Traces, SignalType::Metrics];

    /// Lowercase name, as used in the URL path.
    pub fn as_str(self) -> &'static str {
        match self {
            SignalType::Logs => "logs",
            SignalType::Traces => "traces",
            SignalType::Metrics => "metrics",
        }
    }

    /// Fixed OTLP/HTTP path, also the suffix appended to a base endpoint.
    pub fn path(self) -> &'static str {
        match self {
            SignalType::Logs => "/v1/logs",
            SignalType::Traces => "/v1/traces",
            SignalType::Metrics => "/v1/metrics",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
