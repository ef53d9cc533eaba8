//! Daemon launch sequencing: configuration, telemetry, bridge and host loop.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use ortho_config::OrthoError;
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
use thiserror::Error;
use tracing::info;

use scenelink_config::Config;

use crate::bridge::Bridge;
use crate::commands::scene_router;
use crate::executor::HostLoop;
use crate::reporter::{LifecycleReporter, StructuredLifecycleReporter};
use crate::scene::Scene;
use crate::shutdown::ShutdownToken;
use crate::telemetry::{self, TelemetryError};

const LAUNCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::launch");

/// How often the host loop wakes to check for shutdown when idle.
const HOST_TICK: Duration = Duration::from_millis(10);

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader error when configuration cannot be resolved.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader returning a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced while launching the daemon.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Config {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Signals {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl From<Arc<OrthoError>> for LaunchError {
    fn from(source: Arc<OrthoError>) -> Self {
        Self::Config { source }
    }
}

impl From<TelemetryError> for LaunchError {
    fn from(source: TelemetryError) -> Self {
        Self::Telemetry { source }
    }
}

/// Runs the daemon with the production collaborators until SIGINT, SIGTERM
/// or SIGHUP arrives.
///
/// # Errors
///
/// Returns [`LaunchError`] when configuration, telemetry or signal handling
/// cannot be set up. A failure to bind the bridge is not fatal: the daemon
/// keeps running without a server, as an embedding host would.
pub fn run_daemon() -> Result<(), LaunchError> {
    let shutdown = ShutdownToken::new();
    for signal in [SIGINT, SIGTERM, SIGHUP] {
        signal_hook::flag::register(signal, shutdown.flag())
            .map_err(|source| LaunchError::Signals { source })?;
    }
    run_daemon_with(
        &SystemConfigLoader,
        Arc::new(StructuredLifecycleReporter::new()),
        &shutdown,
    )
    .map(drop)
}

/// Runs the daemon with injected collaborators until `shutdown` triggers and
/// returns the final scene.
///
/// # Errors
///
/// Returns [`LaunchError`] when configuration or telemetry cannot be set up.
pub fn run_daemon_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn LifecycleReporter>,
    shutdown: &ShutdownToken,
) -> Result<Scene, LaunchError> {
    let config = loader.load()?;
    telemetry::initialise(&config)?;
    info!(
        target: LAUNCH_TARGET,
        endpoint = %config.endpoint(),
        log_format = %config.log_format(),
        "starting scenelink daemon"
    );

    let (mut host_loop, executor) = HostLoop::new(Scene::with_default_environment());
    let mut bridge = Bridge::new(&config, executor, reporter);
    bridge.initialize(scene_router());

    host_loop.run_until(shutdown, HOST_TICK);

    info!(target: LAUNCH_TARGET, "shutdown requested");
    bridge.deinitialize();
    host_loop.run_pending();
    Ok(host_loop.into_host())
}
