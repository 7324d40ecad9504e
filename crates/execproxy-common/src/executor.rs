//! Executor Contract
//!
//! The abstract interface every transport both calls (client side) and
//! serves (server side). A concrete execution engine is supplied to a
//! server by its host process; a started transport client satisfies the
//! same contract, so callers stay transport-transparent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::protocol::error::Result;
use crate::types::{Hash, Tx};

/// Interface to a block-execution engine.
///
/// Every operation is a single atomic request/response exchange. Engine
/// failures are reported as [`ProxyError::Executor`] and carried across the
/// wire verbatim, without reinterpretation by the proxy layer.
///
/// Implementations must tolerate concurrent invocation; the transport
/// servers impose no global serialization across inbound requests.
///
/// [`ProxyError::Executor`]: crate::ProxyError::Executor
#[async_trait]
pub trait Executor: Send + Sync {
    /// Establishes genesis state and returns the genesis state root along
    /// with the max byte budget for the first block.
    ///
    /// Meaningfully called at most once per chain lifetime; idempotence is
    /// the engine's responsibility, not the contract's.
    async fn init_chain(
        &self,
        genesis_time: DateTime<Utc>,
        initial_height: u64,
        chain_id: &str,
    ) -> Result<(Hash, u64)>;

    /// Retrieves the currently pending transactions. The sequence may be
    /// empty; an empty mempool is not a failure.
    async fn get_txs(&self) -> Result<Vec<Tx>>;

    /// Applies `txs` atomically against `prev_state_root` and returns the
    /// updated root plus the max byte budget for the next block. Transaction
    /// order is preserved end to end.
    async fn execute_txs(
        &self,
        txs: Vec<Tx>,
        block_height: u64,
        timestamp: DateTime<Utc>,
        prev_state_root: Hash,
    ) -> Result<(Hash, u64)>;

    /// Marks `block_height` as irreversible.
    async fn set_final(&self, block_height: u64) -> Result<()>;
}
