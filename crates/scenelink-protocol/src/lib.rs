//! Wire types shared by the scenelink bridge and its clients.
//!
//! ## Protocol
//!
//! A client writes one JSON request per line:
//!
//! ```json
//! {"command":"create_actor","params":{"type":"PointLight","name":"Key"}}
//! ```
//!
//! and receives exactly one envelope per request, also newline terminated:
//!
//! ```json
//! {"status":"success","result":{"name":"Key","class":"PointLight"}}
//! {"status":"error","error":"Actor with name 'Key' already exists"}
//! ```
//!
//! Older clients send `type` instead of `command` and omit the trailing
//! newline; [`FrameReader`] accepts a buffered payload that already forms a
//! complete JSON document so those clients keep working.

mod envelope;
mod errors;
mod frame;
mod request;

pub use envelope::Envelope;
pub use errors::{FrameError, ProtocolError};
pub use frame::{FrameReader, write_frame};
pub use request::CommandRequest;
