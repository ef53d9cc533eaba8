//! Error types for request parsing and frame handling.

use std::io;

use thiserror::Error;

/// Errors raised while turning a frame into a [`crate::CommandRequest`].
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame was empty after trimming whitespace.
    #[error("empty request")]
    EmptyRequest,

    /// Frame is not syntactically valid JSON.
    #[error("malformed JSON request: {source}")]
    MalformedJson {
        #[source]
        source: serde_json::Error,
    },

    /// Frame is valid JSON but does not match the request schema.
    #[error("invalid request structure: {message}")]
    InvalidStructure { message: String },
}

impl ProtocolError {
    /// Classifies a serde error as a syntax or a schema failure.
    #[must_use]
    pub fn from_json_error(source: serde_json::Error) -> Self {
        if source.is_data() {
            Self::InvalidStructure {
                message: source.to_string(),
            }
        } else {
            Self::MalformedJson { source }
        }
    }

    /// Creates an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }
}

/// Errors raised while reading or writing frames.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Underlying socket read or write failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Buffered frame grew past the configured limit.
    #[error("request too large: {size} bytes exceeds {max_size} byte limit")]
    TooLarge { size: usize, max_size: usize },

    /// Outgoing message could not be serialised.
    #[error("failed to serialize frame: {0}")]
    Serialize(#[from] serde_json::Error),
}
