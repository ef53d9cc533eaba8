//! Listener implementation for the bridge socket.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, info, warn};

use scenelink_config::BridgeEndpoint;

use super::registry::ConnectionRegistry;
use super::{ConnectionHandler, LISTENER_TARGET, ListenerError};
use crate::shutdown::ShutdownToken;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Bound, non-blocking TCP listener that has not started accepting yet.
#[derive(Debug)]
pub(crate) struct SocketListener {
    endpoint: BridgeEndpoint,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl SocketListener {
    /// Binds `endpoint` with address reuse enabled and starts listening.
    pub(crate) fn bind(endpoint: &BridgeEndpoint, backlog: u16) -> Result<Self, ListenerError> {
        let listener = bind_tcp(endpoint.host(), endpoint.port(), backlog)?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ListenerError::LocalAddr { source })?;
        Ok(Self {
            endpoint: endpoint.clone(),
            listener,
            local_addr,
        })
    }

    /// Address actually bound, which differs from the endpoint for port 0.
    pub(crate) const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Spawns the accept loop. Every accepted connection is handed to
    /// `handler` on its own worker thread.
    pub(crate) fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
        shutdown: ShutdownToken,
    ) -> Result<ListenerHandle, ListenerError> {
        let local_addr = self.local_addr;
        let registry = Arc::new(ConnectionRegistry::default());
        let loop_registry = Arc::clone(&registry);
        let loop_shutdown = shutdown.clone();
        let handle = thread::Builder::new()
            .name("scenelink-accept".to_owned())
            .spawn(move || {
                run_accept_loop(&self, &loop_shutdown, &handler, &loop_registry);
                self
            })
            .map_err(|source| ListenerError::Spawn { source })?;
        Ok(ListenerHandle {
            shutdown,
            registry,
            local_addr,
            handle: Some(handle),
        })
    }
}

/// Handle to the background accept thread and its connection workers.
#[derive(Debug)]
pub(crate) struct ListenerHandle {
    shutdown: ShutdownToken,
    registry: Arc<ConnectionRegistry>,
    local_addr: SocketAddr,
    handle: Option<thread::JoinHandle<SocketListener>>,
}

impl ListenerHandle {
    pub(crate) fn shutdown(&self) {
        self.shutdown.trigger();
    }

    pub(crate) const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub(crate) fn active_connections(&self) -> usize {
        self.registry.active()
    }

    /// Joins the accept thread, then closes every connection and joins its
    /// worker, then releases the listening socket.
    pub(crate) fn join(mut self) -> Result<(), ListenerError> {
        self.shutdown.trigger();
        let accept = match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| ListenerError::ThreadPanic),
            None => return Ok(()),
        };
        let closed = self.registry.close_all();
        debug!(target: LISTENER_TARGET, closed, "connections closed");
        let listener = accept?;
        info!(
            target: LISTENER_TARGET,
            endpoint = %listener.endpoint,
            addr = %listener.local_addr,
            "socket listener closed"
        );
        drop(listener);
        Ok(())
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.trigger();
        if self.handle.is_some() {
            self.registry.interrupt_all();
        }
    }
}

fn run_accept_loop(
    listener: &SocketListener,
    shutdown: &ShutdownToken,
    handler: &Arc<dyn ConnectionHandler>,
    registry: &ConnectionRegistry,
) {
    info!(
        target: LISTENER_TARGET,
        endpoint = %listener.endpoint,
        addr = %listener.local_addr,
        "socket listener active"
    );
    let mut last_error = None::<io::ErrorKind>;
    while !shutdown.is_triggered() {
        match accept_connection(&listener.listener) {
            Ok(Some(stream)) => {
                last_error = None;
                if let Err(error) = registry.spawn(stream, Arc::clone(handler)) {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "failed to start connection worker"
                    );
                }
            }
            Ok(None) => {
                registry.reap();
                thread::sleep(ACCEPT_BACKOFF);
            }
            Err(error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "socket accept error"
                    );
                }
                last_error = Some(kind);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }
}

fn accept_connection(listener: &TcpListener) -> Result<Option<TcpStream>, io::Error> {
    match listener.accept() {
        Ok((stream, _)) => {
            stream.set_nonblocking(false)?;
            stream.set_nodelay(true)?;
            Ok(Some(stream))
        }
        Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(error) => Err(error),
    }
}

fn bind_tcp(host: &str, port: u16, backlog: u16) -> Result<TcpListener, ListenerError> {
    let addr = resolve(host, port)?;
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
        .map_err(|source| ListenerError::Socket { addr, source })?;
    socket
        .set_reuse_address(true)
        .map_err(|source| ListenerError::ReuseAddress { addr, source })?;
    socket
        .bind(&addr.into())
        .map_err(|source| ListenerError::BindTcp { addr, source })?;
    socket
        .listen(i32::from(backlog))
        .map_err(|source| ListenerError::Listen { addr, source })?;
    socket
        .set_nonblocking(true)
        .map_err(|source| ListenerError::NonBlocking { source })?;
    Ok(socket.into())
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, ListenerError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?;
    addrs
        .find(|addr| matches!(addr, SocketAddr::V4(_) | SocketAddr::V6(_)))
        .ok_or_else(|| ListenerError::ResolveEmpty {
            host: host.to_owned(),
            port,
        })
}
