//! Error types for request dispatch failures.
//!
//! Every variant is rendered into an error envelope for the client; the
//! `Display` text is the message the client sees.

use scenelink_protocol::{Envelope, FrameError, ProtocolError};
use thiserror::Error;

use crate::executor::ExecutorError;

/// Errors surfaced while reading, parsing or executing a request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Request frame could not be parsed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// No registered group owns the command.
    #[error("Unknown command: {command}")]
    UnknownCommand { command: String },

    /// Reading or writing a frame failed.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The host could not run the command.
    #[error(transparent)]
    Execution(#[from] ExecutorError),
}

impl DispatchError {
    /// Creates an unknown command error.
    pub fn unknown_command(command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            command: command.into(),
        }
    }

    /// Renders the error as a client-facing envelope.
    #[must_use]
    pub fn to_envelope(&self) -> Envelope {
        Envelope::error(self.to_string())
    }
}
