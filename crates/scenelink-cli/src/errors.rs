//! Error types for the client runtime.

use std::io;
use std::sync::Arc;

use scenelink_protocol::FrameError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("--params must be a JSON object: {0}")]
    ParamsNotJson(serde_json::Error),
    #[error("--params must be a JSON object, not {kind}")]
    ParamsNotObject { kind: &'static str },
    #[error("failed to resolve bridge address {endpoint}: {source}")]
    Resolve { endpoint: String, source: io::Error },
    #[error("failed to connect to bridge at {endpoint}: {source}")]
    Connect { endpoint: String, source: io::Error },
    #[error("failed to send request to bridge: {0}")]
    SendRequest(FrameError),
    #[error("failed to read response from bridge: {0}")]
    ReadResponse(FrameError),
    #[error("bridge closed the connection without responding")]
    MissingResponse,
    #[error("failed to parse bridge response: {0}")]
    ParseResponse(serde_json::Error),
    #[error("failed to render bridge response: {0}")]
    RenderResponse(serde_json::Error),
    #[error("failed to print response: {0}")]
    ForwardResponse(io::Error),
}

/// Returns the JSON type name used in parameter errors.
pub(crate) const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
