//! Binary Transport Client
//!
//! Proxies the executor contract over length-prefixed postcard frames on
//! TCP. Each call opens a fresh connection, so concurrent calls on one
//! started client never serialize against each other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use execproxy_common::protocol::error::{ProxyError, Result};
use execproxy_common::protocol::messages::{
    ExecuteTxsRequest, GetTxsRequest, InitChainRequest, SetFinalRequest,
};
use execproxy_common::protocol::{Request, RequestBody, ResponseBody, WireError};
use execproxy_common::transport::{framing, BinaryCodec};
use execproxy_common::types::{hash_from_wire, unix_seconds};
use execproxy_common::{Executor, Hash, ProxyConfig, Tx};

/// Client for the binary transport.
///
/// The connection handle is created by [`start`](Self::start) and released
/// by [`stop`](Self::stop); both take `&mut self`, so they can never overlap
/// with in-flight calls. Using the client before `start` or after `stop`
/// returns [`ProxyError::NotStarted`].
pub struct BinaryClient {
    target: Option<String>,
    config: ProxyConfig,
}

impl BinaryClient {
    /// Creates an unstarted client with default configuration.
    pub fn new() -> Self {
        Self {
            target: None,
            config: ProxyConfig::default(),
        }
    }

    /// Replaces the configuration wholesale. Takes effect for calls issued
    /// after it returns; typically called once before [`start`](Self::start).
    pub fn set_config(&mut self, config: ProxyConfig) {
        self.config = config;
    }

    /// Establishes the connection handle.
    ///
    /// Dials `target` once to surface connection failures immediately; the
    /// probe connection is then dropped and every call dials its own.
    pub async fn start(&mut self, target: &str) -> Result<()> {
        let probe = framing::connect(target).await?;
        drop(probe);

        self.target = Some(target.to_string());
        tracing::debug!(endpoint = target, "binary client started");
        Ok(())
    }

    /// Releases the connection handle. A no-op when the client was never
    /// started.
    pub async fn stop(&mut self) -> Result<()> {
        self.target = None;
        Ok(())
    }

    fn target(&self) -> Result<&str> {
        self.target.as_deref().ok_or(ProxyError::NotStarted)
    }

    /// Issues exactly one wire request within the configured timeout.
    async fn call(&self, body: RequestBody) -> Result<ResponseBody> {
        let target = self.target()?;
        let request = Request::new(body);
        let timeout = self.config.default_timeout;

        let exchange = async {
            let mut stream = framing::connect(target).await?;
            let encoded = BinaryCodec::encode_request(&request)?;
            framing::send_frame(&mut stream, &encoded).await?;
            let frame = framing::recv_frame(&mut stream).await?;
            BinaryCodec::decode_response(&frame)
        };

        let response = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| ProxyError::Timeout(timeout))??;

        if response.id != request.id {
            return Err(ProxyError::InvalidResponse(format!(
                "response id {} does not match request id {}",
                response.id, request.id
            )));
        }

        match (response.result, response.error) {
            (Some(result), None) => Ok(result),
            (_, Some(WireError::Executor(msg))) => Err(ProxyError::Executor(msg)),
            (_, Some(WireError::Decode(msg))) => Err(ProxyError::Decode(msg)),
            _ => Err(ProxyError::InvalidResponse(
                "response carries neither result nor error".into(),
            )),
        }
    }
}

impl Default for BinaryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Executor for BinaryClient {
    async fn init_chain(
        &self,
        genesis_time: DateTime<Utc>,
        initial_height: u64,
        chain_id: &str,
    ) -> Result<(Hash, u64)> {
        let body = RequestBody::InitChain(InitChainRequest {
            genesis_time: unix_seconds(&genesis_time),
            initial_height,
            chain_id: chain_id.to_string(),
        });

        match self.call(body).await? {
            ResponseBody::InitChain(resp) => {
                Ok((hash_from_wire(&resp.state_root), resp.max_bytes))
            }
            _ => Err(mismatched("init_chain")),
        }
    }

    async fn get_txs(&self) -> Result<Vec<Tx>> {
        match self.call(RequestBody::GetTxs(GetTxsRequest {})).await? {
            ResponseBody::GetTxs(resp) => Ok(resp.txs),
            _ => Err(mismatched("get_txs")),
        }
    }

    async fn execute_txs(
        &self,
        txs: Vec<Tx>,
        block_height: u64,
        timestamp: DateTime<Utc>,
        prev_state_root: Hash,
    ) -> Result<(Hash, u64)> {
        let body = RequestBody::ExecuteTxs(ExecuteTxsRequest {
            txs,
            block_height,
            timestamp: unix_seconds(&timestamp),
            prev_state_root: prev_state_root.to_vec(),
        });

        match self.call(body).await? {
            ResponseBody::ExecuteTxs(resp) => {
                Ok((hash_from_wire(&resp.updated_state_root), resp.max_bytes))
            }
            _ => Err(mismatched("execute_txs")),
        }
    }

    async fn set_final(&self, block_height: u64) -> Result<()> {
        match self
            .call(RequestBody::SetFinal(SetFinalRequest { block_height }))
            .await?
        {
            ResponseBody::SetFinal(_) => Ok(()),
            _ => Err(mismatched("set_final")),
        }
    }
}

fn mismatched(method: &str) -> ProxyError {
    ProxyError::InvalidResponse(format!("mismatched response body for {}", method))
}
