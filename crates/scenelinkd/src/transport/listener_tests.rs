//! Tests for the socket listener.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rstest::{fixture, rstest};

use scenelink_config::BridgeEndpoint;

use super::{ConnectionHandler, CountingHandler, EchoHandler, ListenerError, SocketListener};
use crate::shutdown::ShutdownToken;

#[derive(Clone)]
struct CountingFixture {
    count: Arc<AtomicUsize>,
    handler: Arc<CountingHandler>,
}

#[fixture]
fn counting_fixture() -> CountingFixture {
    let (count, handler) = CountingHandler::new();
    CountingFixture { count, handler }
}

#[fixture]
fn tcp_endpoint() -> BridgeEndpoint {
    BridgeEndpoint::new("127.0.0.1", 0)
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

fn wait_for_count(count: &AtomicUsize, expected: usize) -> bool {
    wait_until(|| count.load(Ordering::SeqCst) >= expected)
}

#[rstest]
fn tcp_listener_accepts_connections(
    tcp_endpoint: BridgeEndpoint,
    counting_fixture: CountingFixture,
) {
    let listener = SocketListener::bind(&tcp_endpoint, 5).expect("bind tcp listener");
    let addr = listener.local_addr();
    let CountingFixture { count, handler } = counting_fixture;
    let handler: Arc<dyn ConnectionHandler> = handler;
    let handle = listener
        .start(handler, ShutdownToken::new())
        .expect("start listener");

    TcpStream::connect(addr).expect("connect first client");
    TcpStream::connect(addr).expect("connect second client");

    assert!(wait_for_count(&count, 2), "expected two connections");
    handle.shutdown();
    handle.join().expect("join listener");
}

#[rstest]
fn connections_are_served_concurrently(tcp_endpoint: BridgeEndpoint) {
    let listener = SocketListener::bind(&tcp_endpoint, 5).expect("bind tcp listener");
    let addr = listener.local_addr();
    let handle = listener
        .start(Arc::new(EchoHandler), ShutdownToken::new())
        .expect("start listener");

    let mut first = TcpStream::connect(addr).expect("connect first client");
    let mut second = TcpStream::connect(addr).expect("connect second client");
    for (client, text) in [(&mut second, "two\n"), (&mut first, "one\n")] {
        client.write_all(text.as_bytes()).expect("write line");
        let mut echoed = String::new();
        BufReader::new(client)
            .read_line(&mut echoed)
            .expect("read echo");
        assert_eq!(echoed, text);
    }

    assert!(wait_until(|| handle.active_connections() == 2));
    handle.join().expect("join listener");
}

#[rstest]
fn join_closes_open_connections(tcp_endpoint: BridgeEndpoint) {
    let listener = SocketListener::bind(&tcp_endpoint, 5).expect("bind tcp listener");
    let addr = listener.local_addr();
    let handle = listener
        .start(Arc::new(EchoHandler), ShutdownToken::new())
        .expect("start listener");

    let mut client = TcpStream::connect(addr).expect("connect client");
    assert!(wait_until(|| handle.active_connections() == 1));

    handle.join().expect("join listener");

    client
        .set_read_timeout(Some(Duration::from_secs(2)))
        .expect("set read timeout");
    let mut buffer = [0_u8; 16];
    let read = client.read(&mut buffer).unwrap_or(0);
    assert_eq!(read, 0, "server side should have closed the connection");
}

#[rstest]
fn rebinds_the_same_port_after_join(tcp_endpoint: BridgeEndpoint) {
    let first = SocketListener::bind(&tcp_endpoint, 5).expect("bind first listener");
    let addr: SocketAddr = first.local_addr();
    let handle = first
        .start(Arc::new(EchoHandler), ShutdownToken::new())
        .expect("start first listener");
    let mut client = TcpStream::connect(addr).expect("connect client");
    client.write_all(b"ping\n").expect("write line");
    let mut echoed = String::new();
    BufReader::new(&mut client)
        .read_line(&mut echoed)
        .expect("read echo");
    handle.join().expect("join first listener");

    let same_port = BridgeEndpoint::new("127.0.0.1", addr.port());
    let second = SocketListener::bind(&same_port, 5).expect("rebind same port");
    assert_eq!(second.local_addr().port(), addr.port());
}

#[rstest]
fn bind_reports_port_in_use(tcp_endpoint: BridgeEndpoint) {
    let first = SocketListener::bind(&tcp_endpoint, 5).expect("bind first listener");
    let taken = BridgeEndpoint::new("127.0.0.1", first.local_addr().port());
    let error = SocketListener::bind(&taken, 5).expect_err("second bind should fail");
    assert!(matches!(error, ListenerError::BindTcp { .. }));
}
