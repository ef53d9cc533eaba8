//! Response serialisation helpers for the dispatch loop.

use std::io::Write;

use scenelink_protocol::{Envelope, write_frame};

use super::errors::DispatchError;

/// Writer that frames envelopes onto a stream.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one envelope as a JSON line and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub fn write_envelope(&mut self, envelope: &Envelope) -> Result<(), DispatchError> {
        write_frame(&mut self.writer, envelope)?;
        Ok(())
    }

    /// Writes `error` as an error envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_error(&mut self, error: &DispatchError) -> Result<(), DispatchError> {
        self.write_envelope(&error.to_envelope())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn writes_success_line() {
        let mut output = Vec::new();
        let mut writer = ResponseWriter::new(&mut output);
        writer
            .write_envelope(&Envelope::success(json!({ "actors": [] })))
            .expect("write envelope");

        let response = String::from_utf8(output).expect("valid utf8");
        assert_eq!(response, "{\"status\":\"success\",\"result\":{\"actors\":[]}}\n");
    }

    #[rstest]
    fn write_error_uses_error_shape() {
        let mut output = Vec::new();
        let mut writer = ResponseWriter::new(&mut output);
        writer
            .write_error(&DispatchError::unknown_command("bogus"))
            .expect("write error");

        let response = String::from_utf8(output).expect("valid utf8");
        assert!(response.contains(r#""status":"error""#));
        assert!(response.contains(r#""error":"Unknown command: bogus""#));
        assert!(response.ends_with('\n'));
    }
}
