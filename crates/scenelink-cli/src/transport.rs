//! TCP transport for the client.

use std::io::{self, BufReader};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use scenelink_config::BridgeEndpoint;
use scenelink_protocol::{CommandRequest, Envelope, FrameReader, write_frame};

use crate::AppError;

pub(crate) const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;

pub(crate) fn connect(endpoint: &BridgeEndpoint) -> Result<TcpStream, AppError> {
    let address =
        resolve_tcp_address(endpoint.host(), endpoint.port()).map_err(|source| {
            AppError::Resolve {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;
    TcpStream::connect_timeout(&address, CONNECTION_TIMEOUT).map_err(|source| {
        AppError::Connect {
            endpoint: endpoint.to_string(),
            source,
        }
    })
}

/// Sends `request` and waits for exactly one response envelope.
pub(crate) fn exchange(stream: TcpStream, request: &CommandRequest) -> Result<Envelope, AppError> {
    let mut writer = stream.try_clone().map_err(|error| AppError::SendRequest(error.into()))?;
    write_frame(&mut writer, request).map_err(AppError::SendRequest)?;

    let mut frames = FrameReader::new(BufReader::new(stream), MAX_RESPONSE_BYTES);
    let frame = frames
        .next_frame()
        .map_err(AppError::ReadResponse)?
        .ok_or(AppError::MissingResponse)?;
    serde_json::from_slice(&frame).map_err(AppError::ParseResponse)
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    let mut addrs = (host, port).to_socket_addrs()?;
    addrs
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}
