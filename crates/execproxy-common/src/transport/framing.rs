//! Length-Prefixed TCP Framing
//!
//! Wire format for the binary transport:
//!
//! ```text
//! [4-byte length as u32 big-endian] [postcard data]
//! ```
//!
//! The length prefix bounds every message before it is read, so the binary
//! transport never accepts unbounded input; [`MAX_FRAME_SIZE`] is a fixed
//! sanity cap on the prefix itself.

use std::net::ToSocketAddrs;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::protocol::error::{ProxyError, Result};

/// Hard upper bound on a single frame (32 MB).
pub const MAX_FRAME_SIZE: usize = 32 * 1024 * 1024;

/// Connects to a remote endpoint, trying each resolved address until one
/// succeeds.
pub async fn connect(addr: &str) -> Result<TcpStream> {
    let socket_addrs = addr
        .to_socket_addrs()
        .map_err(|e| ProxyError::Connection(format!("invalid address '{}': {}", addr, e)))?;

    let mut last_err = None;
    for socket_addr in socket_addrs {
        match TcpStream::connect(socket_addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }

    Err(ProxyError::Connection(format!(
        "failed to connect to {}: {}",
        addr,
        last_err
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no addresses resolved".to_string())
    )))
}

/// Sends one length-prefixed frame.
pub async fn send_frame(stream: &mut TcpStream, data: &[u8]) -> Result<()> {
    let len = data.len() as u32;

    stream
        .write_all(&len.to_be_bytes())
        .await
        .map_err(|e| map_io_error(e, "writing length prefix"))?;
    stream
        .write_all(data)
        .await
        .map_err(|e| map_io_error(e, "writing frame data"))?;
    stream
        .flush()
        .await
        .map_err(|e| map_io_error(e, "flushing stream"))?;

    Ok(())
}

/// Receives one length-prefixed frame.
///
/// Frames larger than [`MAX_FRAME_SIZE`] are refused before any payload is
/// read.
pub async fn recv_frame(stream: &mut TcpStream) -> Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    stream
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| map_io_error(e, "reading length prefix"))?;

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(ProxyError::RequestTooLarge {
            size: len,
            limit: MAX_FRAME_SIZE,
        });
    }

    let mut buf = vec![0u8; len];
    stream
        .read_exact(&mut buf)
        .await
        .map_err(|e| map_io_error(e, "reading frame data"))?;

    Ok(buf)
}

/// Maps IO errors into proxy error categories: connection loss becomes
/// `Connection`, everything else stays `Io`.
fn map_io_error(err: std::io::Error, context: &str) -> ProxyError {
    match err.kind() {
        std::io::ErrorKind::ConnectionReset
        | std::io::ErrorKind::ConnectionAborted
        | std::io::ErrorKind::BrokenPipe
        | std::io::ErrorKind::NotConnected
        | std::io::ErrorKind::UnexpectedEof => {
            ProxyError::Connection(format!("{}: connection lost", context))
        }
        _ => ProxyError::Io(err),
    }
}
