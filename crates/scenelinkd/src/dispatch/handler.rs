//! Connection handler that dispatches framed commands.
//!
//! This module provides the `DispatchConnectionHandler` which implements the
//! `ConnectionHandler` trait from the transport layer. It reads request
//! frames one at a time, hands each resolved command to the host executor
//! and writes exactly one envelope back before reading the next frame.

use std::net::TcpStream;
use std::sync::Arc;

use scenelink_protocol::{CommandRequest, Envelope, FrameError, FrameReader};
use tracing::{debug, warn};

use crate::executor::HostExecutor;
use crate::shutdown::ShutdownToken;
use crate::transport::ConnectionHandler;

use super::errors::DispatchError;
use super::response::ResponseWriter;
use super::router::CommandRouter;
use super::DISPATCH_TARGET;

/// Connection handler that parses, routes and executes commands.
///
/// Requests on one connection are processed strictly in order. Malformed
/// requests and unknown commands are answered with an error envelope and the
/// connection stays open; an oversized frame is answered and then the
/// connection is closed because the stream cannot be resynchronised.
pub(crate) struct DispatchConnectionHandler<H> {
    router: Arc<CommandRouter<H>>,
    executor: HostExecutor<H>,
    shutdown: ShutdownToken,
    max_request_bytes: usize,
}

impl<H: 'static> DispatchConnectionHandler<H> {
    pub(crate) const fn new(
        router: Arc<CommandRouter<H>>,
        executor: HostExecutor<H>,
        shutdown: ShutdownToken,
        max_request_bytes: usize,
    ) -> Self {
        Self {
            router,
            executor,
            shutdown,
            max_request_bytes,
        }
    }

    fn serve(&self, stream: TcpStream) -> Result<(), DispatchError> {
        let reader = stream.try_clone().map_err(FrameError::from)?;
        let mut frames = FrameReader::new(reader, self.max_request_bytes);
        let mut writer = ResponseWriter::new(stream);

        while !self.shutdown.is_triggered() {
            match frames.next_frame() {
                Ok(Some(frame)) => {
                    let envelope = self.respond(&frame);
                    writer.write_envelope(&envelope)?;
                }
                Ok(None) => {
                    debug!(target: DISPATCH_TARGET, "client disconnected");
                    return Ok(());
                }
                Err(FrameError::TooLarge { size, max_size }) => {
                    let error = DispatchError::from(FrameError::TooLarge { size, max_size });
                    writer.write_error(&error)?;
                    return Err(error);
                }
                Err(error) => return Err(error.into()),
            }
        }
        Ok(())
    }

    /// Produces the envelope for one request frame.
    fn respond(&self, frame: &[u8]) -> Envelope {
        let request = match CommandRequest::parse(frame) {
            Ok(request) => request,
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, "malformed request");
                return DispatchError::from(error).to_envelope();
            }
        };

        let Some(route) = self.router.resolve(request.command()) else {
            debug!(target: DISPATCH_TARGET, command = request.command(), "unknown command");
            return DispatchError::unknown_command(request.command()).to_envelope();
        };

        debug!(
            target: DISPATCH_TARGET,
            command = request.command(),
            group = self.router.route_name(route),
            "dispatching request"
        );

        let router = Arc::clone(&self.router);
        let outcome = self.executor.execute(
            move |host: &mut H| router.invoke(host, route, request.command(), request.params()),
            &self.shutdown,
        );
        match outcome {
            Ok(envelope) => envelope,
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, "command execution failed");
                DispatchError::from(error).to_envelope()
            }
        }
    }
}

impl<H: 'static> ConnectionHandler for DispatchConnectionHandler<H> {
    fn handle(&self, stream: TcpStream) {
        if let Err(error) = self.serve(stream) {
            if self.shutdown.is_triggered() {
                debug!(target: DISPATCH_TARGET, %error, "connection ended during shutdown");
            } else {
                warn!(target: DISPATCH_TARGET, %error, "connection ended with error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::{SocketAddr, TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    use rstest::{fixture, rstest};
    use serde_json::{Value, json};

    use super::*;
    use crate::dispatch::CommandGroup;
    use crate::executor::HostLoop;

    struct CounterGroup;

    impl CommandGroup<u32> for CounterGroup {
        fn name(&self) -> &'static str {
            "counter"
        }

        fn commands(&self) -> Vec<&'static str> {
            vec!["increment", "explode"]
        }

        fn handle(&self, host: &mut u32, command: &str, _params: &Value) -> Value {
            assert_ne!(command, "explode", "handler exploded");
            *host += 1;
            json!({ "count": *host })
        }
    }

    /// Runs one dispatch handler against a single accepted connection while a
    /// host thread drains the executor.
    struct HandlerTestHarness {
        client: BufReader<TcpStream>,
        shutdown: ShutdownToken,
        server: JoinHandle<()>,
        host: JoinHandle<u32>,
    }

    impl HandlerTestHarness {
        fn spawn(max_request_bytes: usize) -> Self {
            let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind listener");
            let addr: SocketAddr = listener.local_addr().expect("listener address");

            let (mut host_loop, executor) = HostLoop::new(0_u32);
            let shutdown = ShutdownToken::new();
            let host_shutdown = shutdown.clone();
            let host = thread::spawn(move || {
                host_loop.run_until(&host_shutdown, Duration::from_millis(5));
                host_loop.into_host()
            });

            let router = Arc::new(CommandRouter::new().with_group(CounterGroup));
            let handler =
                DispatchConnectionHandler::new(router, executor, shutdown.clone(), max_request_bytes);
            let server = thread::spawn(move || {
                let (stream, _) = listener.accept().expect("accept connection");
                handler.handle(stream);
            });

            let client = TcpStream::connect(addr).expect("connect client");
            Self {
                client: BufReader::new(client),
                shutdown,
                server,
                host,
            }
        }

        fn send(&mut self, payload: &[u8]) {
            self.client.get_mut().write_all(payload).expect("write request");
        }

        fn read_envelope(&mut self) -> Value {
            let mut line = String::new();
            self.client.read_line(&mut line).expect("read response");
            serde_json::from_str(&line).expect("response is JSON")
        }

        fn request(&mut self, payload: &str) -> Value {
            self.send(format!("{payload}\n").as_bytes());
            self.read_envelope()
        }

        fn finish(self) -> u32 {
            drop(self.client);
            self.server.join().expect("join server");
            self.shutdown.trigger();
            self.host.join().expect("join host")
        }
    }

    #[fixture]
    fn harness() -> HandlerTestHarness {
        HandlerTestHarness::spawn(1024)
    }

    #[rstest]
    fn serves_sequential_requests_on_one_connection(mut harness: HandlerTestHarness) {
        assert_eq!(
            harness.request(r#"{"command":"ping","params":{}}"#),
            json!({ "status": "success", "result": { "message": "pong" } })
        );
        assert_eq!(
            harness.request(r#"{"command":"increment"}"#),
            json!({ "status": "success", "result": { "count": 1 } })
        );
        assert_eq!(
            harness.request(r#"{"command":"increment"}"#),
            json!({ "status": "success", "result": { "count": 2 } })
        );
        assert_eq!(harness.finish(), 2);
    }

    #[rstest]
    fn malformed_json_keeps_the_connection_open(mut harness: HandlerTestHarness) {
        let response = harness.request("{not json");
        assert_eq!(response["status"], "error");
        assert!(
            response["error"]
                .as_str()
                .is_some_and(|message| message.starts_with("malformed JSON request"))
        );

        let response = harness.request(r#"{"command":"increment"}"#);
        assert_eq!(response["status"], "success");
        harness.finish();
    }

    #[rstest]
    fn unknown_commands_are_reported(mut harness: HandlerTestHarness) {
        assert_eq!(
            harness.request(r#"{"command":"teleport","params":{}}"#),
            json!({ "status": "error", "error": "Unknown command: teleport" })
        );
        assert_eq!(harness.finish(), 0);
    }

    #[rstest]
    fn handler_panics_become_error_envelopes(mut harness: HandlerTestHarness) {
        let response = harness.request(r#"{"command":"explode"}"#);
        assert_eq!(response["status"], "error");
        assert!(
            response["error"]
                .as_str()
                .is_some_and(|message| message.contains("handler exploded"))
        );

        let response = harness.request(r#"{"command":"increment"}"#);
        assert_eq!(response["result"]["count"], 1);
        harness.finish();
    }

    #[rstest]
    fn pipelined_requests_are_answered_in_order(mut harness: HandlerTestHarness) {
        harness.send(b"{\"command\":\"increment\"}\n{\"command\":\"ping\"}\n");
        assert_eq!(harness.read_envelope()["result"]["count"], 1);
        assert_eq!(harness.read_envelope()["result"]["message"], "pong");
        harness.finish();
    }

    #[rstest]
    fn legacy_unterminated_request_is_answered(mut harness: HandlerTestHarness) {
        harness.send(br#"{"type":"ping","params":{}}"#);
        assert_eq!(harness.read_envelope()["result"]["message"], "pong");
        harness.finish();
    }

    #[rstest]
    fn oversized_requests_close_the_connection() {
        let mut harness = HandlerTestHarness::spawn(32);
        let payload = format!(r#"{{"command":"ping","params":{{"pad":"{}"}}}}"#, "x".repeat(64));
        let response = harness.request(&payload);
        assert_eq!(response["status"], "error");
        assert!(
            response["error"]
                .as_str()
                .is_some_and(|message| message.starts_with("request too large"))
        );

        let mut rest = String::new();
        let read = harness.client.read_line(&mut rest).unwrap_or(0);
        assert_eq!(read, 0);
        harness.finish();
    }
}
