//! Structured reporting of bridge lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use scenelink_config::BridgeEndpoint;

use crate::transport::ListenerError;

const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");

/// Observer notified as the bridge server starts and stops.
pub trait LifecycleReporter: Send + Sync {
    /// Invoked before the listener binds.
    fn server_starting(&self, endpoint: &BridgeEndpoint);

    /// Invoked once the listener accepts connections.
    fn server_ready(&self, addr: SocketAddr);

    /// Invoked when binding or spawning the listener fails.
    fn bind_failed(&self, endpoint: &BridgeEndpoint, error: &ListenerError);

    /// Invoked when shutdown of a running server begins.
    fn server_stopping(&self, addr: SocketAddr, active_connections: usize);

    /// Invoked after every thread has been joined and the socket released.
    fn server_stopped(&self, addr: SocketAddr);
}

impl<T> LifecycleReporter for Arc<T>
where
    T: LifecycleReporter + ?Sized,
{
    fn server_starting(&self, endpoint: &BridgeEndpoint) {
        (**self).server_starting(endpoint);
    }

    fn server_ready(&self, addr: SocketAddr) {
        (**self).server_ready(addr);
    }

    fn bind_failed(&self, endpoint: &BridgeEndpoint, error: &ListenerError) {
        (**self).bind_failed(endpoint, error);
    }

    fn server_stopping(&self, addr: SocketAddr, active_connections: usize) {
        (**self).server_stopping(addr, active_connections);
    }

    fn server_stopped(&self, addr: SocketAddr) {
        (**self).server_stopped(addr);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredLifecycleReporter;

impl StructuredLifecycleReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LifecycleReporter for StructuredLifecycleReporter {
    fn server_starting(&self, endpoint: &BridgeEndpoint) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "starting",
            endpoint = %endpoint,
            "starting bridge server"
        );
    }

    fn server_ready(&self, addr: SocketAddr) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "ready",
            addr = %addr,
            "bridge server listening"
        );
    }

    fn bind_failed(&self, endpoint: &BridgeEndpoint, error: &ListenerError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "bind_failed",
            endpoint = %endpoint,
            error = %error,
            "bridge server failed to start"
        );
    }

    fn server_stopping(&self, addr: SocketAddr, active_connections: usize) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "stopping",
            addr = %addr,
            active_connections,
            "stopping bridge server"
        );
    }

    fn server_stopped(&self, addr: SocketAddr) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "stopped",
            addr = %addr,
            "bridge server stopped"
        );
    }
}
