//! JSON-RPC Transport Client
//!
//! Proxies the executor contract as JSON-RPC 2.0 calls over HTTP/1.1. One
//! HTTP connection is opened per call; the handshake and the request both
//! run inside the configured timeout.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::client::conn::http1;
use hyper::Uri;
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use tokio::net::TcpStream;

use execproxy_common::protocol::error::{ProxyError, Result};
use execproxy_common::protocol::jsonrpc::SERVER_ERROR;
use execproxy_common::protocol::messages::{
    ExecuteTxsRequest, ExecuteTxsResponse, GetTxsRequest, GetTxsResponse, InitChainRequest,
    InitChainResponse, SetFinalRequest, SetFinalResponse,
};
use execproxy_common::protocol::{
    JsonRpcRequest, JsonRpcResponse, METHOD_EXECUTE_TXS, METHOD_GET_TXS, METHOD_INIT_CHAIN,
    METHOD_SET_FINAL,
};
use execproxy_common::types::{hash_from_wire, unix_seconds};
use execproxy_common::{Executor, Hash, ProxyConfig, Tx};

/// Resolved `http://host:port` target.
struct Endpoint {
    uri: Uri,
    authority: String,
}

/// Client for the JSON-RPC transport.
///
/// Lifecycle mirrors [`BinaryClient`]: [`start`](Self::start) validates the
/// endpoint and creates the connection handle, [`stop`](Self::stop)
/// releases it, and operations before `start` or after `stop` fail with
/// [`ProxyError::NotStarted`].
///
/// [`BinaryClient`]: crate::BinaryClient
pub struct JsonRpcClient {
    endpoint: Option<Endpoint>,
    config: ProxyConfig,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Creates an unstarted client with default configuration.
    pub fn new() -> Self {
        Self {
            endpoint: None,
            config: ProxyConfig::default(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Replaces the configuration wholesale. Typically called once before
    /// [`start`](Self::start).
    pub fn set_config(&mut self, config: ProxyConfig) {
        self.config = config;
    }

    /// Establishes the connection handle.
    ///
    /// `target` must be an `http://host:port` URL. The endpoint is dialed
    /// once so dial failures surface here rather than on the first call.
    pub async fn start(&mut self, target: &str) -> Result<()> {
        let endpoint = parse_endpoint(target)?;

        let probe = TcpStream::connect(endpoint.authority.as_str())
            .await
            .map_err(|e| {
                ProxyError::Connection(format!("failed to connect to {}: {}", endpoint.authority, e))
            })?;
        drop(probe);

        self.endpoint = Some(endpoint);
        tracing::debug!(endpoint = target, "jsonrpc client started");
        Ok(())
    }

    /// Releases the connection handle. A no-op when the client was never
    /// started.
    pub async fn stop(&mut self) -> Result<()> {
        self.endpoint = None;
        Ok(())
    }

    fn endpoint(&self) -> Result<&Endpoint> {
        self.endpoint.as_ref().ok_or(ProxyError::NotStarted)
    }

    /// Issues exactly one JSON-RPC call within the configured timeout and
    /// unwraps the envelope.
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let endpoint = self.endpoint()?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(method, params, json!(id));
        let timeout = self.config.default_timeout;

        let envelope = tokio::time::timeout(timeout, self.exchange(endpoint, &request))
            .await
            .map_err(|_| ProxyError::Timeout(timeout))??;

        if let Some(error) = envelope.error {
            // Server errors carry the engine's own failure text; everything
            // else is a transport-level decode failure.
            return if error.code == SERVER_ERROR {
                Err(ProxyError::Executor(error.message))
            } else {
                Err(ProxyError::Decode(format!(
                    "{} (code {})",
                    error.message, error.code
                )))
            };
        }

        envelope
            .result
            .ok_or_else(|| ProxyError::InvalidResponse("missing result in response".into()))
    }

    async fn exchange(
        &self,
        endpoint: &Endpoint,
        request: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse> {
        let stream = TcpStream::connect(endpoint.authority.as_str())
            .await
            .map_err(|e| {
                ProxyError::Connection(format!("failed to connect to {}: {}", endpoint.authority, e))
            })?;
        let io = TokioIo::new(stream);

        let (mut sender, conn) = http1::handshake(io)
            .await
            .map_err(|e| ProxyError::Connection(format!("http handshake failed: {}", e)))?;
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!("connection closed: {}", e);
            }
        });

        let body = serde_json::to_vec(request)?;
        let http_request = hyper::Request::builder()
            .method(hyper::Method::POST)
            .uri(endpoint.uri.path())
            .header("Host", endpoint.authority.as_str())
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| ProxyError::Connection(format!("failed to build request: {}", e)))?;

        let response = sender
            .send_request(http_request)
            .await
            .map_err(|e| ProxyError::Connection(format!("http request failed: {}", e)))?;

        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| ProxyError::Connection(format!("failed to read response body: {}", e)))?
            .to_bytes();

        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl Default for JsonRpcClient {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_endpoint(target: &str) -> Result<Endpoint> {
    let uri: Uri = target
        .parse()
        .map_err(|e| ProxyError::Connection(format!("invalid target '{}': {}", target, e)))?;

    if uri.scheme_str() != Some("http") {
        return Err(ProxyError::Connection(format!(
            "unsupported target '{}': only http is supported",
            target
        )));
    }

    let authority = match (uri.host(), uri.port_u16()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => format!("{}:80", host),
        _ => {
            return Err(ProxyError::Connection(format!(
                "invalid target '{}': missing host",
                target
            )))
        }
    };

    Ok(Endpoint { uri, authority })
}

#[async_trait]
impl Executor for JsonRpcClient {
    async fn init_chain(
        &self,
        genesis_time: DateTime<Utc>,
        initial_height: u64,
        chain_id: &str,
    ) -> Result<(Hash, u64)> {
        let params = serde_json::to_value(InitChainRequest {
            genesis_time: unix_seconds(&genesis_time),
            initial_height,
            chain_id: chain_id.to_string(),
        })?;

        let result = self.call(METHOD_INIT_CHAIN, params).await?;
        let resp: InitChainResponse = serde_json::from_value(result)?;
        Ok((hash_from_wire(&resp.state_root), resp.max_bytes))
    }

    async fn get_txs(&self) -> Result<Vec<Tx>> {
        let params = serde_json::to_value(GetTxsRequest {})?;

        let result = self.call(METHOD_GET_TXS, params).await?;
        let resp: GetTxsResponse = serde_json::from_value(result)?;
        Ok(resp.txs)
    }

    async fn execute_txs(
        &self,
        txs: Vec<Tx>,
        block_height: u64,
        timestamp: DateTime<Utc>,
        prev_state_root: Hash,
    ) -> Result<(Hash, u64)> {
        let params = serde_json::to_value(ExecuteTxsRequest {
            txs,
            block_height,
            timestamp: unix_seconds(&timestamp),
            prev_state_root: prev_state_root.to_vec(),
        })?;

        let result = self.call(METHOD_EXECUTE_TXS, params).await?;
        let resp: ExecuteTxsResponse = serde_json::from_value(result)?;
        Ok((hash_from_wire(&resp.updated_state_root), resp.max_bytes))
    }

    async fn set_final(&self, block_height: u64) -> Result<()> {
        let params = serde_json::to_value(SetFinalRequest { block_height })?;

        let result = self.call(METHOD_SET_FINAL, params).await?;
        let _: SetFinalResponse = serde_json::from_value(result)?;
        Ok(())
    }
}
