//! Failures reported by command handlers.
//!
//! The `Display` text of each variant is the `error` string the client sees.

use serde_json::{Value, json};
use thiserror::Error;

/// Outcome of one command handler.
pub type CommandResult = Result<Value, CommandError>;

/// Reasons a command could not be carried out.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("Missing '{name}' parameter")]
    MissingParameter { name: &'static str },

    #[error("Invalid '{name}' parameter: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("{message}")]
    OutOfRange { message: &'static str },

    #[error("Actor with name '{name}' already exists")]
    ActorExists { name: String },

    #[error("Actor not found: {name}")]
    ActorNotFound { name: String },

    #[error("Unknown actor type: {actor_type}")]
    UnknownActorType { actor_type: String },

    #[error("Blueprint already exists: {name}")]
    BlueprintExists { name: String },

    #[error("Blueprint not found: {name}")]
    BlueprintNotFound { name: String },

    #[error("Unknown component type: {component_type}")]
    UnknownComponentType { component_type: String },

    #[error("Component already exists: {name}")]
    ComponentExists { name: String },

    #[error("Component not found: {name}")]
    ComponentNotFound { name: String },

    #[error("Component is not a {expected} component: {name}")]
    WrongComponentKind { name: String, expected: &'static str },

    #[error("Variable already exists: {name}")]
    VariableExists { name: String },

    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    #[error("Pin '{pin}' not found on node {id}")]
    PinNotFound { id: String, pin: String },

    #[error("Ultra Dynamic Sky actor not found: {name}")]
    SkyNotFound { name: String },

    #[error("Ultra Dynamic Weather actor not found")]
    WeatherNotFound,

    #[error("Cesium georeference actor not found")]
    GeoreferenceNotFound,

    #[error("Light already exists: {name}")]
    LightExists { name: String },

    #[error("Light not found: {name}")]
    LightNotFound { name: String },

    #[error("Either 'target' or 'location' must be provided")]
    MissingFocus,

    #[error("Unknown {group} command: {command}")]
    UnknownCommand { group: &'static str, command: String },
}

impl CommandError {
    /// Creates an invalid parameter error.
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Creates a range violation error with a fixed message.
    #[must_use]
    pub const fn out_of_range(message: &'static str) -> Self {
        Self::OutOfRange { message }
    }

    /// Renders the error in the in-band failure shape handlers return.
    #[must_use]
    pub fn to_failure(&self) -> Value {
        json!({ "success": false, "error": self.to_string() })
    }
}
