//! Connection handling abstraction for the listener.

use std::net::TcpStream;

/// Serves accepted connections.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Serves a single connection until the peer disconnects or the server
    /// stops. Runs on a dedicated worker thread; implementations should avoid
    /// panicking.
    fn handle(&self, stream: TcpStream);
}
