//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::api::{ApiConfig, DEFAULT_BASE_URL};
use crate::resolver::ResolveMode;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Default static assets directory.
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Error reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {var}={value:?}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Everything `main` needs to start the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `DELIVERY_API_URL`
    pub api_url: String,
    /// `DELIVERY_API_TOKEN`: bearer token to start the session with
    pub api_token: Option<String>,
    /// `DELIVERY_API_TIMEOUT_SECS`
    pub timeout_secs: u64,
    /// `DELIVERY_MOCK_DATA`: serve this catalog file instead of calling the API
    pub mock_data: Option<PathBuf>,
    /// `DELIVERY_RESOLVE_MODE`
    pub resolve_mode: ResolveMode,
    /// `DELIVERY_BIND_ADDR`
    pub bind_addr: SocketAddr,
    /// `DELIVERY_STATIC_DIR`
    pub static_dir: String,
}

impl ServerConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let timeout_secs = match get("DELIVERY_API_TIMEOUT_SECS") {
            Some(value) => value.trim().parse().map_err(|e| ConfigError {
                var: "DELIVERY_API_TIMEOUT_SECS",
                value: value.clone(),
                reason: format!("{e}"),
            })?,
            None => ApiConfig::default().timeout_secs,
        };

        let resolve_mode = match get("DELIVERY_RESOLVE_MODE") {
            Some(value) => value.parse().map_err(|reason| ConfigError {
                var: "DELIVERY_RESOLVE_MODE",
                value: value.clone(),
                reason,
            })?,
            None => ResolveMode::default(),
        };

        let bind = get("DELIVERY_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind.trim().parse().map_err(|e| ConfigError {
            var: "DELIVERY_BIND_ADDR",
            value: bind.clone(),
            reason: format!("{e}"),
        })?;

        Ok(Self {
            api_url: get("DELIVERY_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_token: get("DELIVERY_API_TOKEN").map(|t| t.trim().to_string()),
            timeout_secs,
            mock_data: get("DELIVERY_MOCK_DATA").map(PathBuf::from),
            resolve_mode,
            bind_addr,
            static_dir: get("DELIVERY_STATIC_DIR")
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
        })
    }

    /// HTTP client configuration.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(&self.api_url).with_timeout(self.timeout_secs)
    }
}
