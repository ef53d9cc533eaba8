//! Command bridge between TCP clients and a single-threaded scene host.
//!
//! Clients connect over TCP (by default `127.0.0.1:55557`) and send one JSON
//! request per line:
//!
//! ```text
//! {"command": "create_actor", "params": {"type": "PointLight", "name": "Key"}}
//! ```
//!
//! Every request receives exactly one response envelope, either
//! `{"status": "success", "result": ...}` or
//! `{"status": "error", "error": "..."}`.
//!
//! ## Threading
//!
//! Each accepted connection is served by its own worker thread. Workers never
//! touch the host directly: they submit a closure through a
//! [`HostExecutor`] and block until the [`HostLoop`] running on the host
//! thread has executed it. No two handlers ever run at the same time, and a
//! panicking handler is reported to its client without taking the host down.
//!
//! ## Lifecycle
//!
//! A [`Bridge`] owns the server. [`Bridge::initialize`] installs the command
//! router and starts listening; [`Bridge::stop_server`] joins every thread
//! before the socket is released and may be called repeatedly;
//! [`Bridge::start_server`] afterwards rebinds the same endpoint.

mod bridge;
pub mod commands;
pub mod dispatch;
pub mod executor;
mod launch;
mod reporter;
pub mod scene;
mod shutdown;
mod telemetry;
mod transport;

pub use bridge::{Bridge, BridgeError, BridgeState};
pub use executor::{ExecutorError, HostExecutor, HostLoop};
pub use launch::{
    ConfigLoader, LaunchError, StaticConfigLoader, SystemConfigLoader, run_daemon,
    run_daemon_with,
};
pub use reporter::{LifecycleReporter, StructuredLifecycleReporter};
pub use shutdown::ShutdownToken;
pub use telemetry::{TelemetryError, TelemetryHandle, initialise as initialise_telemetry};
pub use transport::ListenerError;
