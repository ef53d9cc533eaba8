//! Test helpers for the transport module.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::ConnectionHandler;

pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
        });
        (count, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, _stream: TcpStream) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Echoes every line back until the peer disconnects or the socket is shut
/// down.
pub(crate) struct EchoHandler;

impl ConnectionHandler for EchoHandler {
    fn handle(&self, stream: TcpStream) {
        let Ok(mut writer) = stream.try_clone() else {
            return;
        };
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        while matches!(reader.read_line(&mut line), Ok(read) if read > 0) {
            if writer.write_all(line.as_bytes()).is_err() {
                return;
            }
            line.clear();
        }
    }
}
