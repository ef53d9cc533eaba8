//! Default values used when a configuration layer leaves a field unset.

use crate::endpoint::BridgeEndpoint;
use crate::logging::LogFormat;

/// Loopback address the bridge binds to by default.
pub const DEFAULT_BIND_HOST: &str = "127.0.0.1";

/// Default TCP port for the bridge.
pub const DEFAULT_PORT: u16 = 55557;

/// Default `listen(2)` backlog.
pub const DEFAULT_LISTEN_BACKLOG: u16 = 5;

/// Default upper bound for a request frame (1 MiB).
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binaries.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Endpoint used when neither host nor port is configured.
#[must_use]
pub fn default_endpoint() -> BridgeEndpoint {
    BridgeEndpoint::new(DEFAULT_BIND_HOST, DEFAULT_PORT)
}
