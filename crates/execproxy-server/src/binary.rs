//! Binary Transport Server
//!
//! Accepts length-prefixed postcard frames over TCP and dispatches them to
//! the locally supplied engine. Each accepted connection runs on its own
//! task and processes frames in a keep-alive loop until the peer closes;
//! distinct requests are never ordered against each other.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};

use execproxy_common::protocol::error::{ProxyError, Result};
use execproxy_common::protocol::{Response, WireError};
use execproxy_common::transport::{framing, BinaryCodec};
use execproxy_common::{Executor, ProxyConfig};

use crate::service::ExecutorService;

/// Server for the binary transport.
pub struct BinaryServer {
    service: Arc<ExecutorService>,
    config: ProxyConfig,
    listener: TcpListener,
}

impl BinaryServer {
    /// Binds to `addr` and prepares to serve `executor`.
    pub async fn bind(executor: Arc<dyn Executor>, config: ProxyConfig, addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ProxyError::Connection(format!("failed to bind to {}: {}", addr, e)))?;

        Ok(Self {
            service: Arc::new(ExecutorService::new(executor)),
            config,
            listener,
        })
    }

    /// The actual bound address, useful when binding to port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| ProxyError::Connection(format!("failed to get local addr: {}", e)))
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Runs the accept loop, spawning one task per connection.
    pub async fn serve(self) -> Result<()> {
        tracing::info!(addr = %self.local_addr()?, "binary server listening");

        loop {
            let (stream, peer_addr) = self.listener.accept().await.map_err(|e| {
                ProxyError::Connection(format!("failed to accept connection: {}", e))
            })?;
            tracing::debug!(%peer_addr, "connection established");

            let service = self.service.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, service).await {
                    tracing::error!(%peer_addr, "connection error: {}", e);
                }
            });
        }
    }
}

/// Processes frames on one connection until the peer closes it.
async fn handle_connection(mut stream: TcpStream, service: Arc<ExecutorService>) -> Result<()> {
    loop {
        let frame = match framing::recv_frame(&mut stream).await {
            Ok(frame) => frame,
            Err(ProxyError::Connection(_)) => {
                tracing::debug!("connection closed by peer");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let request = match BinaryCodec::decode_request(&frame) {
            Ok(request) => request,
            Err(e) => {
                // The envelope is unreadable, so no request id is known.
                let response = Response::failure(0, WireError::Decode(e.to_string()));
                send_response(&mut stream, &response).await?;
                continue;
            }
        };

        let id = request.id;
        let response = match service.dispatch(request.body).await {
            Ok(result) => Response::success(id, result),
            Err(e) => Response::failure(id, wire_error(e)),
        };

        send_response(&mut stream, &response).await?;
    }
}

async fn send_response(stream: &mut TcpStream, response: &Response) -> Result<()> {
    let encoded = BinaryCodec::encode_response(response)?;
    framing::send_frame(stream, &encoded).await
}

/// Splits dispatch failures into the two wire categories. Engine failures
/// keep their original text so they pass through opaquely.
fn wire_error(e: ProxyError) -> WireError {
    match e {
        ProxyError::Executor(msg) => WireError::Executor(msg),
        ProxyError::Decode(msg) => WireError::Decode(msg),
        other => WireError::Executor(other.to_string()),
    }
}
