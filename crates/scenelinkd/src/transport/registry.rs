//! Bookkeeping for live connection workers.

use std::io;
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use super::{ConnectionHandler, LISTENER_TARGET};

/// Tracks one worker thread per accepted connection.
#[derive(Debug, Default)]
pub(super) struct ConnectionRegistry {
    connections: Mutex<Vec<TrackedConnection>>,
    next_id: AtomicU64,
}

#[derive(Debug)]
struct TrackedConnection {
    id: u64,
    peer: Option<SocketAddr>,
    control: TcpStream,
    worker: JoinHandle<()>,
}

impl ConnectionRegistry {
    /// Starts a worker thread serving `stream`.
    pub(super) fn spawn(
        &self,
        stream: TcpStream,
        handler: Arc<dyn ConnectionHandler>,
    ) -> io::Result<()> {
        let control = stream.try_clone()?;
        let peer = stream.peer_addr().ok();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let worker = thread::Builder::new()
            .name(format!("scenelink-conn-{id}"))
            .spawn(move || handler.handle(stream))?;
        debug!(target: LISTENER_TARGET, id, peer = ?peer, "connection accepted");
        self.lock().push(TrackedConnection {
            id,
            peer,
            control,
            worker,
        });
        Ok(())
    }

    /// Joins workers whose connections have already ended.
    pub(super) fn reap(&self) {
        let finished = {
            let mut connections = self.lock();
            let (finished, live): (Vec<_>, Vec<_>) = connections
                .drain(..)
                .partition(|connection| connection.worker.is_finished());
            *connections = live;
            finished
        };
        for connection in finished {
            connection.join();
        }
    }

    /// Number of workers still serving a connection.
    pub(super) fn active(&self) -> usize {
        self.lock()
            .iter()
            .filter(|connection| !connection.worker.is_finished())
            .count()
    }

    /// Unblocks every worker by shutting its socket down without joining.
    pub(super) fn interrupt_all(&self) {
        for connection in self.lock().iter() {
            connection.interrupt();
        }
    }

    /// Shuts every connection down and joins its worker. Sockets are released
    /// only after the owning worker has exited.
    pub(super) fn close_all(&self) -> usize {
        let connections: Vec<_> = self.lock().drain(..).collect();
        let closed = connections.len();
        for connection in &connections {
            connection.interrupt();
        }
        for connection in connections {
            connection.join();
        }
        closed
    }

    fn lock(&self) -> MutexGuard<'_, Vec<TrackedConnection>> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl TrackedConnection {
    fn interrupt(&self) {
        if let Err(error) = self.control.shutdown(Shutdown::Both)
            && error.kind() != io::ErrorKind::NotConnected
        {
            warn!(
                target: LISTENER_TARGET,
                id = self.id,
                error = %error,
                "failed to shut down connection"
            );
        }
    }

    fn join(self) {
        let Self {
            id,
            peer,
            control,
            worker,
        } = self;
        if worker.join().is_err() {
            warn!(target: LISTENER_TARGET, id, peer = ?peer, "connection worker panicked");
        }
        drop(control);
        debug!(target: LISTENER_TARGET, id, peer = ?peer, "connection closed");
    }
}
