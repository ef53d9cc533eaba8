//! Bridge lifecycle: owns the command router and the TCP server.
//!
//! ```text
//! Uninitialized ──initialize──▶ Running ⇄ Stopped
//!                     │                    ▲
//!                     └──bind failure──────┘
//! ```
//!
//! The bridge lives on the host thread next to the [`HostLoop`] it feeds.
//! `start_server` and `stop_server` may be called any number of times; a
//! stopped server can be restarted and rebinds the same endpoint.
//!
//! [`HostLoop`]: crate::executor::HostLoop

use std::net::SocketAddr;
use std::sync::Arc;

use scenelink_config::{BridgeEndpoint, Config};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dispatch::{CommandRouter, DispatchConnectionHandler};
use crate::executor::HostExecutor;
use crate::reporter::LifecycleReporter;
use crate::shutdown::ShutdownToken;
use crate::transport::{ListenerError, ListenerHandle, SocketListener};

const BRIDGE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::bridge");

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// No router has been installed yet.
    Uninitialized,
    /// The server is accepting connections.
    Running,
    /// Initialised, but no server is running.
    Stopped,
}

/// Errors reported by [`Bridge::start_server`].
#[derive(Debug, Error)]
pub enum BridgeError {
    /// `start_server` was called before `initialize`.
    #[error("bridge has not been initialised")]
    Uninitialized,
    /// The listener could not be bound or started.
    #[error(transparent)]
    Listener(#[from] ListenerError),
}

struct RunningServer {
    listener: ListenerHandle,
    shutdown: ShutdownToken,
}

/// Connects remote clients to a host value of type `H`.
pub struct Bridge<H> {
    endpoint: BridgeEndpoint,
    listen_backlog: u16,
    max_request_bytes: usize,
    executor: HostExecutor<H>,
    reporter: Arc<dyn LifecycleReporter>,
    router: Option<Arc<CommandRouter<H>>>,
    server: Option<RunningServer>,
}

impl<H: 'static> Bridge<H> {
    /// Creates an uninitialised bridge that will submit work through
    /// `executor`.
    pub fn new(
        config: &Config,
        executor: HostExecutor<H>,
        reporter: Arc<dyn LifecycleReporter>,
    ) -> Self {
        Self {
            endpoint: config.endpoint(),
            listen_backlog: config.listen_backlog(),
            max_request_bytes: config.max_request_bytes(),
            executor,
            reporter,
            router: None,
            server: None,
        }
    }

    /// Installs `router` and starts the server.
    ///
    /// A bind failure is reported and leaves the bridge initialised but not
    /// running; `start_server` may be retried later. Initialising twice keeps
    /// the first router.
    pub fn initialize(&mut self, router: CommandRouter<H>) {
        if self.router.is_some() {
            warn!(target: BRIDGE_TARGET, "bridge already initialised");
            return;
        }
        info!(
            target: BRIDGE_TARGET,
            commands = router.command_count(),
            "bridge initialised"
        );
        self.router = Some(Arc::new(router));
        if let Err(error) = self.start_server() {
            debug!(target: BRIDGE_TARGET, %error, "bridge left idle after failed start");
        }
    }

    /// Binds the endpoint and starts accepting connections.
    ///
    /// Calling this while the server runs is a logged no-op.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Uninitialized`] before [`Bridge::initialize`]
    /// and [`BridgeError::Listener`] when binding fails; no thread is left
    /// running in either case.
    pub fn start_server(&mut self) -> Result<(), BridgeError> {
        let Some(router) = &self.router else {
            return Err(BridgeError::Uninitialized);
        };
        if let Some(server) = &self.server {
            info!(
                target: BRIDGE_TARGET,
                addr = %server.listener.local_addr(),
                "server already running"
            );
            return Ok(());
        }

        self.reporter.server_starting(&self.endpoint);
        let shutdown = ShutdownToken::new();
        let handler = Arc::new(DispatchConnectionHandler::new(
            Arc::clone(router),
            self.executor.clone(),
            shutdown.clone(),
            self.max_request_bytes,
        ));
        let started = SocketListener::bind(&self.endpoint, self.listen_backlog)
            .and_then(|listener| listener.start(handler, shutdown.clone()));
        match started {
            Ok(listener) => {
                self.reporter.server_ready(listener.local_addr());
                self.server = Some(RunningServer { listener, shutdown });
                Ok(())
            }
            Err(error) => {
                self.reporter.bind_failed(&self.endpoint, &error);
                Err(error.into())
            }
        }
    }

    /// Stops the server, joining the accept thread and every connection
    /// worker before the listening socket is released.
    ///
    /// Idempotent: calling it on a bridge that is not running does nothing.
    pub fn stop_server(&mut self) {
        let Some(RunningServer { listener, shutdown }) = self.server.take() else {
            debug!(target: BRIDGE_TARGET, "stop requested while not running");
            return;
        };
        let addr = listener.local_addr();
        self.reporter
            .server_stopping(addr, listener.active_connections());
        shutdown.trigger();
        if let Err(error) = listener.join() {
            warn!(target: BRIDGE_TARGET, %error, "server threads did not shut down cleanly");
        }
        self.reporter.server_stopped(addr);
    }

    /// Stops the server for good.
    pub fn deinitialize(&mut self) {
        self.stop_server();
        info!(target: BRIDGE_TARGET, "bridge deinitialised");
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> BridgeState {
        match (&self.router, &self.server) {
            (None, _) => BridgeState::Uninitialized,
            (Some(_), Some(_)) => BridgeState::Running,
            (Some(_), None) => BridgeState::Stopped,
        }
    }

    /// Returns `true` while the server accepts connections.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.server.is_some()
    }

    /// Address the running server is bound to.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server
            .as_ref()
            .map(|server| server.listener.local_addr())
    }

    /// Endpoint the server binds when started.
    #[must_use]
    pub const fn endpoint(&self) -> &BridgeEndpoint {
        &self.endpoint
    }
}

impl<H> Drop for Bridge<H> {
    fn drop(&mut self) {
        if let Some(server) = self.server.take() {
            server.shutdown.trigger();
            if let Err(error) = server.listener.join() {
                warn!(target: BRIDGE_TARGET, %error, "server threads did not shut down cleanly");
            }
        }
    }
}
