//! TCP listener for the bridge.
//!
//! The transport module binds the configured endpoint and accepts
//! connections on a background thread. Each accepted connection is served by
//! its own worker thread; the listener keeps track of those workers so that
//! shutdown can join them before their sockets are released.

mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod listener_tests;
mod registry;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub(crate) use self::handler::ConnectionHandler;
pub(crate) use self::listener::{ListenerHandle, SocketListener};
#[cfg(test)]
pub(crate) use self::test_utils::{CountingHandler, EchoHandler};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
