//! Executor Dispatch
//!
//! Shared by both transport servers: converts wire messages to domain
//! values, invokes the locally supplied engine, and converts the result
//! back. The service holds only a reference to the engine and never
//! manages its lifecycle.

use std::sync::Arc;

use execproxy_common::protocol::error::Result;
use execproxy_common::protocol::messages::{
    ExecuteTxsResponse, GetTxsResponse, InitChainResponse, SetFinalResponse,
};
use execproxy_common::protocol::{RequestBody, ResponseBody};
use execproxy_common::types::{hash_from_wire, timestamp_from_unix};
use execproxy_common::Executor;

/// Transport-agnostic dispatcher over an [`Executor`].
#[derive(Clone)]
pub struct ExecutorService {
    executor: Arc<dyn Executor>,
}

impl ExecutorService {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Invokes the engine operation matching `body`.
    ///
    /// Engine failures propagate unchanged; the only failures added here
    /// are decode errors for out-of-range wire timestamps.
    pub async fn dispatch(&self, body: RequestBody) -> Result<ResponseBody> {
        tracing::debug!(method = body.method(), "dispatching request");

        match body {
            RequestBody::InitChain(req) => {
                let genesis_time = timestamp_from_unix(req.genesis_time)?;
                let (state_root, max_bytes) = self
                    .executor
                    .init_chain(genesis_time, req.initial_height, &req.chain_id)
                    .await?;

                Ok(ResponseBody::InitChain(InitChainResponse {
                    state_root: state_root.to_vec(),
                    max_bytes,
                }))
            }
            RequestBody::GetTxs(_) => {
                let txs = self.executor.get_txs().await?;
                Ok(ResponseBody::GetTxs(GetTxsResponse { txs }))
            }
            RequestBody::ExecuteTxs(req) => {
                let timestamp = timestamp_from_unix(req.timestamp)?;
                let prev_state_root = hash_from_wire(&req.prev_state_root);
                let (updated_state_root, max_bytes) = self
                    .executor
                    .execute_txs(req.txs, req.block_height, timestamp, prev_state_root)
                    .await?;

                Ok(ResponseBody::ExecuteTxs(ExecuteTxsResponse {
                    updated_state_root: updated_state_root.to_vec(),
                    max_bytes,
                }))
            }
            RequestBody::SetFinal(req) => {
                self.executor.set_final(req.block_height).await?;
                Ok(ResponseBody::SetFinal(SetFinalResponse {}))
            }
        }
    }
}
