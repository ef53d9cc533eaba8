//! Newline-delimited frame codec.

use std::io::{self, Read, Write};
use std::mem;

use serde::Serialize;
use serde::de::IgnoredAny;

use crate::errors::FrameError;

const READ_CHUNK: usize = 4096;

/// Reads request frames from a byte stream.
///
/// A frame ends at `\n`. Bytes after the delimiter stay buffered for the next
/// call, so pipelined requests are served in order. Blank lines are skipped.
/// When no delimiter has arrived yet but the buffered bytes already form one
/// complete JSON document, that document is returned as a frame.
pub struct FrameReader<R> {
    reader: R,
    buffer: Vec<u8>,
    max_bytes: usize,
    searched: usize,
    scan: DocumentScan,
}

impl<R: Read> FrameReader<R> {
    /// Wraps `reader`, rejecting frames whose payload exceeds `max_bytes`.
    /// The delimiter does not count towards the limit.
    pub fn new(reader: R, max_bytes: usize) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            max_bytes,
            searched: 0,
            scan: DocumentScan::default(),
        }
    }

    /// Returns the next frame, or `None` once the peer has closed the stream.
    ///
    /// Unterminated bytes left at end of stream are returned as a final frame.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Io`] when reading fails and
    /// [`FrameError::TooLarge`] when a frame exceeds the size limit.
    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>, FrameError> {
        let mut chunk = [0_u8; READ_CHUNK];
        loop {
            if let Some(frame) = self.take_buffered_frame()? {
                return Ok(Some(frame));
            }

            let bytes_read = read_with_retry(&mut self.reader, &mut chunk)?;
            if bytes_read == 0 {
                let rest = self.take_all();
                return Ok(if rest.trim_ascii().is_empty() {
                    None
                } else {
                    Some(rest)
                });
            }
            self.buffer.extend_from_slice(&chunk[..bytes_read]);
        }
    }

    fn take_buffered_frame(&mut self) -> Result<Option<Vec<u8>>, FrameError> {
        while let Some(offset) = self
            .buffer
            .iter()
            .skip(self.searched)
            .position(|byte| *byte == b'\n')
        {
            let newline = self.searched + offset;
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            self.searched = 0;
            self.scan = DocumentScan::default();
            if line.trim_ascii().is_empty() {
                continue;
            }
            self.enforce_limit(payload_len(&line))?;
            return Ok(Some(line));
        }
        self.searched = self.buffer.len();

        self.enforce_limit(payload_len(&self.buffer))?;
        if self.scan.is_single_object(&self.buffer) {
            return Ok(Some(self.take_all()));
        }
        Ok(None)
    }

    fn take_all(&mut self) -> Vec<u8> {
        self.searched = 0;
        self.scan = DocumentScan::default();
        mem::take(&mut self.buffer)
    }

    const fn enforce_limit(&self, size: usize) -> Result<(), FrameError> {
        if size > self.max_bytes {
            return Err(FrameError::TooLarge {
                size,
                max_size: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// Frame length without its line delimiter.
fn payload_len(frame: &[u8]) -> usize {
    let line = frame.strip_suffix(b"\n").unwrap_or(frame);
    line.strip_suffix(b"\r").unwrap_or(line).len()
}

/// Incremental search for the end of an unterminated top-level JSON object.
///
/// Each byte is inspected once; the buffer is handed to the JSON parser only
/// when the outermost brace closes.
#[derive(Debug, Default)]
struct DocumentScan {
    scanned: usize,
    depth: usize,
    in_string: bool,
    escaped: bool,
    end: Option<usize>,
    rejected: bool,
}

impl DocumentScan {
    /// Returns `true` when `buffer` holds exactly one complete JSON object,
    /// optionally surrounded by whitespace.
    fn is_single_object(&mut self, buffer: &[u8]) -> bool {
        if self.rejected {
            return false;
        }
        if self.end.is_none() {
            for (index, byte) in buffer.iter().enumerate().skip(self.scanned) {
                if self.step(*byte) {
                    self.end = Some(index);
                    break;
                }
                if self.rejected {
                    return false;
                }
            }
            self.scanned = buffer.len();
        }
        let Some(end) = self.end else {
            return false;
        };
        let (document, rest) = buffer.split_at(end + 1);
        if rest.trim_ascii().is_empty() && serde_json::from_slice::<IgnoredAny>(document).is_ok() {
            return true;
        }
        self.rejected = true;
        false
    }

    /// Consumes one byte; returns `true` when it closes the outermost object.
    fn step(&mut self, byte: u8) -> bool {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == b'"' {
                self.in_string = false;
            }
            return false;
        }
        match (self.depth, byte) {
            (0, b'{') => self.depth = 1,
            (0, other) if other.is_ascii_whitespace() => {}
            (0, _) => self.rejected = true,
            (_, b'"') => self.in_string = true,
            (_, b'{' | b'[') => self.depth += 1,
            (_, b'}' | b']') => {
                self.depth -= 1;
                return self.depth == 0;
            }
            _ => {}
        }
        false
    }
}

/// Serialises `message` as one JSON line and flushes the writer.
///
/// # Errors
///
/// Returns an error if serialisation, writing or flushing fails.
pub fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<(), FrameError>
where
    W: Write,
    T: Serialize + ?Sized,
{
    serde_json::to_writer(&mut *writer, message)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn read_with_retry<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::Cursor;

    use rstest::rstest;
    use serde_json::json;

    use super::*;

    /// Yields one scripted chunk per read, then fails with `WouldBlock`.
    struct ScriptedReader {
        chunks: VecDeque<io::Result<Vec<u8>>>,
    }

    impl ScriptedReader {
        fn new(chunks: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                chunks: chunks.into(),
            }
        }
    }

    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.chunks.pop_front() {
                Some(Ok(chunk)) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                Some(Err(error)) => Err(error),
                None => Err(io::Error::new(io::ErrorKind::WouldBlock, "script exhausted")),
            }
        }
    }

    fn frames_of(input: &[u8]) -> Vec<Vec<u8>> {
        let mut reader = FrameReader::new(Cursor::new(input.to_vec()), 1024);
        let mut frames = Vec::new();
        while let Some(frame) = reader.next_frame().expect("read frame") {
            frames.push(frame);
        }
        frames
    }

    #[rstest]
    fn splits_pipelined_frames() {
        let frames = frames_of(b"{\"command\":\"a\"}\n{\"command\":\"b\"}\n");
        assert_eq!(
            frames,
            vec![b"{\"command\":\"a\"}\n".to_vec(), b"{\"command\":\"b\"}\n".to_vec()]
        );
    }

    #[rstest]
    fn skips_blank_lines() {
        let frames = frames_of(b"\n\r\n{\"command\":\"a\"}\n\n");
        assert_eq!(frames, vec![b"{\"command\":\"a\"}\n".to_vec()]);
    }

    #[rstest]
    fn returns_unterminated_tail_at_end_of_stream() {
        let frames = frames_of(b"{\"command\":\"a\"}\nnot json");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1], b"not json".to_vec());
    }

    #[rstest]
    fn empty_stream_yields_nothing() {
        assert!(frames_of(b"").is_empty());
    }

    #[rstest]
    fn accepts_complete_document_without_delimiter() {
        let reader = ScriptedReader::new(vec![
            Ok(br#"{"type":"ping","#.to_vec()),
            Ok(br#""params":{}}"#.to_vec()),
        ]);
        let mut frames = FrameReader::new(reader, 1024);
        let frame = frames
            .next_frame()
            .expect("read frame")
            .expect("frame available");
        assert_eq!(frame, br#"{"type":"ping","params":{}}"#.to_vec());
    }

    #[rstest]
    fn retries_interrupted_reads() {
        let reader = ScriptedReader::new(vec![
            Err(io::Error::new(io::ErrorKind::Interrupted, "signal")),
            Ok(b"{\"command\":\"a\"}\n".to_vec()),
        ]);
        let mut frames = FrameReader::new(reader, 1024);
        let frame = frames.next_frame().expect("read frame");
        assert!(frame.is_some());
    }

    #[rstest]
    fn rejects_oversized_frames() {
        let payload = vec![b'x'; 64];
        let mut reader = FrameReader::new(Cursor::new(payload), 16);
        let result = reader.next_frame();
        assert!(matches!(
            result,
            Err(FrameError::TooLarge { max_size: 16, .. })
        ));
    }

    #[rstest]
    fn limit_excludes_the_delimiter() {
        let payload = br#"{"command":"ping"}"#;
        let mut framed = payload.to_vec();
        framed.extend_from_slice(b"\r\n");
        let mut reader = FrameReader::new(Cursor::new(framed.clone()), payload.len());
        let frame = reader.next_frame().expect("frame at the limit is accepted");
        assert_eq!(frame, Some(framed));
    }

    #[rstest]
    fn limit_still_rejects_one_byte_over() {
        let payload = br#"{"command":"ping"}"#;
        let mut framed = payload.to_vec();
        framed.push(b'\n');
        let mut reader = FrameReader::new(Cursor::new(framed), payload.len() - 1);
        assert!(matches!(
            reader.next_frame(),
            Err(FrameError::TooLarge { .. })
        ));
    }

    #[rstest]
    fn legacy_document_split_across_many_reads() {
        let padding = "x".repeat(20_000);
        let document = format!(r#"{{"type":"ping","params":{{"pad":"{padding}","s":"}}\"{{"}}}}"#);
        let chunks = document
            .as_bytes()
            .chunks(READ_CHUNK)
            .map(|chunk| Ok(chunk.to_vec()))
            .collect();
        let mut frames = FrameReader::new(ScriptedReader::new(chunks), 64 * 1024);
        let frame = frames
            .next_frame()
            .expect("read frame")
            .expect("frame available");
        assert_eq!(frame, document.into_bytes());
    }

    #[rstest]
    #[case(b"[1, 2]".as_slice())]
    #[case(b"{\"a\":1} {\"b\":2}".as_slice())]
    #[case(b"{\"a\":}".as_slice())]
    fn non_documents_wait_for_a_delimiter(#[case] input: &[u8]) {
        let mut frames = FrameReader::new(ScriptedReader::new(vec![Ok(input.to_vec())]), 1024);
        let error = frames.next_frame().expect_err("no frame without a delimiter");
        assert!(matches!(error, FrameError::Io(ref io) if io.kind() == io::ErrorKind::WouldBlock));
    }

    #[rstest]
    fn writes_newline_terminated_json() {
        let mut output = Vec::new();
        write_frame(&mut output, &json!({"status": "success"})).expect("write frame");
        assert_eq!(output, b"{\"status\":\"success\"}\n".to_vec());
    }
}
