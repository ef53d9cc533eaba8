//! Shared configuration for the scenelink bridge and its client.
//!
//! Values are layered by `ortho_config`: built-in defaults, configuration
//! files, `SCENELINK_*` environment variables and finally command-line flags.
//! Every field is optional so that partially specified layers merge cleanly;
//! the accessors on [`Config`] apply the defaults from [`defaults`].

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub mod defaults;
mod endpoint;
mod logging;

pub use defaults::{
    DEFAULT_BIND_HOST, DEFAULT_LISTEN_BACKLOG, DEFAULT_LOG_FILTER, DEFAULT_MAX_REQUEST_BYTES,
    DEFAULT_PORT, default_endpoint, default_log_filter, default_log_format,
};
pub use endpoint::{BridgeEndpoint, EndpointParseError};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration shared by the daemon and the command-line client.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq, OrthoConfig)]
#[ortho_config(prefix = "SCENELINK")]
pub struct Config {
    /// Host name or address the bridge listens on.
    pub bind_host: Option<String>,
    /// TCP port the bridge listens on.
    pub port: Option<u16>,
    /// Backlog passed to `listen(2)`.
    pub listen_backlog: Option<u16>,
    /// Upper bound for a single request frame in bytes.
    pub max_request_bytes: Option<usize>,
    /// `tracing` filter expression.
    pub log_filter: Option<String>,
    /// Output format for structured logs.
    pub log_format: Option<LogFormat>,
}

impl Config {
    /// Loads configuration from every supported layer.
    ///
    /// # Errors
    ///
    /// Returns the loader error when a layer cannot be read or merged.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        <Self as OrthoConfig>::load()
    }

    /// Endpoint the bridge binds to.
    #[must_use]
    pub fn endpoint(&self) -> BridgeEndpoint {
        BridgeEndpoint::new(
            self.bind_host.as_deref().unwrap_or(DEFAULT_BIND_HOST),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Listen backlog for the bridge socket.
    #[must_use]
    pub fn listen_backlog(&self) -> u16 {
        self.listen_backlog.unwrap_or(DEFAULT_LISTEN_BACKLOG)
    }

    /// Maximum accepted request frame size in bytes.
    #[must_use]
    pub fn max_request_bytes(&self) -> usize {
        self.max_request_bytes
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_MAX_REQUEST_BYTES)
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(default_log_format)
    }

    /// Returns a copy bound to `endpoint`.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: &BridgeEndpoint) -> Self {
        self.bind_host = Some(endpoint.host().to_owned());
        self.port = Some(endpoint.port());
        self
    }
}
