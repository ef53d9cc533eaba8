//! Request deserialisation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ProtocolError;

/// Parsed command request.
///
/// The `command` field names the operation; `params` is always a JSON object
/// once parsing succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    #[serde(alias = "type")]
    command: String,
    #[serde(default)]
    params: Value,
}

impl CommandRequest {
    /// Builds a request for `command` with an object of parameters.
    #[must_use]
    pub fn new(command: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            command: command.into(),
            params: Value::Object(params),
        }
    }

    /// Parses a frame into a request.
    ///
    /// Surrounding whitespace (including the newline delimiter) is ignored.
    /// Missing or `null` parameters become an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::EmptyRequest`] for blank input,
    /// [`ProtocolError::MalformedJson`] for invalid JSON and
    /// [`ProtocolError::InvalidStructure`] when the document does not match
    /// the request schema.
    pub fn parse(frame: &[u8]) -> Result<Self, ProtocolError> {
        let trimmed = frame.trim_ascii();
        if trimmed.is_empty() {
            return Err(ProtocolError::EmptyRequest);
        }

        let mut request: Self =
            serde_json::from_slice(trimmed).map_err(ProtocolError::from_json_error)?;
        request.normalise()?;
        Ok(request)
    }

    fn normalise(&mut self) -> Result<(), ProtocolError> {
        if self.command.trim().is_empty() {
            return Err(ProtocolError::invalid_structure("command field is empty"));
        }
        match self.params {
            Value::Null => {
                self.params = Value::Object(Map::new());
                Ok(())
            }
            Value::Object(_) => Ok(()),
            _ => Err(ProtocolError::invalid_structure(
                "params must be a JSON object",
            )),
        }
    }

    /// Returns the normalised (trimmed) command name.
    #[must_use]
    pub fn command(&self) -> &str {
        self.command.trim()
    }

    /// Returns the request parameters.
    #[must_use]
    pub const fn params(&self) -> &Value {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn parses_command_and_params() {
        let input = br#"{"command":"create_actor","params":{"name":"Cube"}}"#;
        let request = CommandRequest::parse(input).expect("parse request");
        assert_eq!(request.command(), "create_actor");
        assert_eq!(request.params(), &json!({"name": "Cube"}));
    }

    #[rstest]
    fn accepts_legacy_type_field() {
        let input = br#"{"type":"ping","params":{}}"#;
        let request = CommandRequest::parse(input).expect("parse legacy request");
        assert_eq!(request.command(), "ping");
    }

    #[rstest]
    #[case(br#"{"command":"ping"}"#.as_slice())]
    #[case(br#"{"command":"ping","params":null}"#.as_slice())]
    fn missing_params_become_empty_object(#[case] input: &[u8]) {
        let request = CommandRequest::parse(input).expect("parse request");
        assert_eq!(request.params(), &json!({}));
    }

    #[rstest]
    fn trims_surrounding_whitespace() {
        let input = b"  {\"command\":\" ping \"}\r\n";
        let request = CommandRequest::parse(input).expect("parse request");
        assert_eq!(request.command(), "ping");
    }

    #[rstest]
    #[case(b"".as_slice())]
    #[case(b"   \n".as_slice())]
    fn rejects_blank_input(#[case] input: &[u8]) {
        let result = CommandRequest::parse(input);
        assert!(matches!(result, Err(ProtocolError::EmptyRequest)));
    }

    #[rstest]
    #[case(b"not json".as_slice())]
    #[case(br#"{"command":"ping""#.as_slice())]
    fn rejects_malformed_json(#[case] input: &[u8]) {
        let result = CommandRequest::parse(input);
        assert!(matches!(result, Err(ProtocolError::MalformedJson { .. })));
    }

    #[rstest]
    #[case(br#"{"params":{}}"#.as_slice())]
    #[case(br#"{"command":""}"#.as_slice())]
    #[case(br#"{"command":7}"#.as_slice())]
    #[case(br#"{"command":"ping","params":[1,2]}"#.as_slice())]
    #[case(br#"[1,2,3]"#.as_slice())]
    fn rejects_invalid_structure(#[case] input: &[u8]) {
        let result = CommandRequest::parse(input);
        assert!(matches!(
            result,
            Err(ProtocolError::InvalidStructure { .. })
        ));
    }

    #[rstest]
    fn serialises_with_command_field() {
        let request = CommandRequest::new("ping", Map::new());
        let encoded = serde_json::to_value(&request).expect("serialise request");
        assert_eq!(encoded, json!({"command": "ping", "params": {}}));
    }
}
