//! Request dispatch for bridge connections.
//!
//! This module reads framed [`CommandRequest`](scenelink_protocol::CommandRequest)
//! messages from connected clients, resolves each command against the
//! registered handler groups and returns one
//! [`Envelope`](scenelink_protocol::Envelope) per request. Handler execution
//! is always marshalled onto the host thread through the executor; only
//! protocol failures and unknown commands are answered directly on the
//! connection thread.
//!
//! ## Routing
//!
//! Each handler group declares the commands it owns. The router builds one
//! lookup table from those lists when groups are registered; a command owned
//! by two groups stays with the group registered first. The `ping` command is
//! answered by the router itself.

mod errors;
mod group;
mod handler;
mod response;
mod router;

pub use self::errors::DispatchError;
pub use self::group::CommandGroup;
pub(crate) use self::handler::DispatchConnectionHandler;
pub use self::router::{CommandRouter, Route};

const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
