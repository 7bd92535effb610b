use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::SpyError;

/// Default listen address, the standard OTLP/HTTP port on all interfaces.
pub const DEFAULT_LISTEN_ADDR: &str = ":4318";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "OTLP/HTTP spy: decode, log and relay telemetry", long_about = None)]
pub struct Settings {
    /// Address to listen on. A bare `:port` binds every interface.
    #[arg(long, env = "LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: String,

    /// Base collector address; `/v1/<signal>` is appended per signal
    #[arg(long, env = "ENDPOINT")]
    pub endpoint: Option<String>,

    /// Full upstream address for logs (overrides --endpoint)
    #[arg(long, env = "LOGS_ENDPOINT")]
    pub logs_endpoint: Option<String>,

    /// Full upstream address for traces (overrides --endpoint)
    #[arg(long, env = "TRACES_ENDPOINT")]
    pub traces_endpoint: Option<String>,

    /// Full upstream address for metrics (overrides --endpoint)
    #[arg(long, env = "METRICS_ENDPOINT")]
    pub metrics_endpoint: Option<String>,

    /// Upper bound for one upstream exchange, in seconds
    #[arg(long, env = "FORWARD_TIMEOUT_SECS", default_value = "30")]
    pub forward_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            endpoint: None,
            logs_endpoint: None,
            traces_endpoint: None,
            metrics_endpoint: None,
            forward_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Validates the settings and returns an error if invalid.
    pub fn validate(&self) -> Result<(), SpyError> {
        self.listen_socket_addr()?;
        validate_timeout(self.forward_timeout_secs)?;
        Ok(())
    }

    /// Listen address as a socket address, expanding `:port` to `0.0.0.0:port`.
    pub fn listen_socket_addr(&self) -> Result<SocketAddr, SpyError> {
        let addr = self.listen_addr.trim();
        let normalized = if addr.starts_with(':') {
            format!("0.0.0.0{addr}")
        } else {
            addr.to_string()
        };
        normalized.parse::<SocketAddr>().map_err(|e| {
            SpyError::Config(format!("Invalid listen address '{}': {e}", self.listen_addr))
        })
    }

    pub fn forward_timeout(&self) -> Duration {
        Duration::from_secs(self.forward_timeout_secs)
    }
}

fn validate_timeout(secs: u64) -> Result<(), SpyError> {
    if secs == 0 {
        return Err(SpyError::Config("Forward timeout cannot be 0".into()));
    }
    Ok(())
}

/// Parse settings from command-line arguments and the environment, then validate.
///
/// Exits the process on `--help`, `--version` or unparsable arguments.
pub fn get_configuration() -> Result<Settings, SpyError> {
    let settings = Settings::parse();
    settings.validate()?;
    Ok(settings)
}
