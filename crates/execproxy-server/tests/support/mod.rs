//! Shared fixtures for the proxy integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use execproxy_common::protocol::error::{ProxyError, Result};
use execproxy_common::types::hash_from_wire;
use execproxy_common::{Executor, Hash, ProxyConfig, Tx};
use execproxy_server::{BinaryServer, JsonRpcServer};

/// One observed engine invocation, with the exact arguments the server
/// handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    InitChain {
        genesis_time: DateTime<Utc>,
        initial_height: u64,
        chain_id: String,
    },
    GetTxs,
    ExecuteTxs {
        txs: Vec<Tx>,
        block_height: u64,
        timestamp: DateTime<Utc>,
        prev_state_root: Hash,
    },
    SetFinal {
        block_height: u64,
    },
}

/// Scripted engine that records every call it receives.
pub struct MockExecutor {
    pub genesis_root: Hash,
    pub updated_root: Hash,
    pub max_bytes: u64,
    pub txs: Vec<Tx>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self {
            genesis_root: hash_from_wire(&[1, 2, 3]),
            updated_root: hash_from_wire(&[4, 5, 6]),
            max_bytes: 1_000_000,
            txs: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_txs(txs: Vec<Tx>) -> Self {
        Self {
            txs,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Executor for MockExecutor {
    async fn init_chain(
        &self,
        genesis_time: DateTime<Utc>,
        initial_height: u64,
        chain_id: &str,
    ) -> Result<(Hash, u64)> {
        self.record(RecordedCall::InitChain {
            genesis_time,
            initial_height,
            chain_id: chain_id.to_string(),
        });
        Ok((self.genesis_root, self.max_bytes))
    }

    async fn get_txs(&self) -> Result<Vec<Tx>> {
        self.record(RecordedCall::GetTxs);
        Ok(self.txs.clone())
    }

    async fn execute_txs(
        &self,
        txs: Vec<Tx>,
        block_height: u64,
        timestamp: DateTime<Utc>,
        prev_state_root: Hash,
    ) -> Result<(Hash, u64)> {
        self.record(RecordedCall::ExecuteTxs {
            txs,
            block_height,
            timestamp,
            prev_state_root,
        });
        Ok((self.updated_root, self.max_bytes))
    }

    async fn set_final(&self, block_height: u64) -> Result<()> {
        self.record(RecordedCall::SetFinal { block_height });
        Ok(())
    }
}

/// Engine whose every operation fails with the same message.
pub struct FailingExecutor {
    pub message: String,
}

impl FailingExecutor {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    fn fail<T>(&self) -> Result<T> {
        Err(ProxyError::Executor(self.message.clone()))
    }
}

#[async_trait]
impl Executor for FailingExecutor {
    async fn init_chain(&self, _: DateTime<Utc>, _: u64, _: &str) -> Result<(Hash, u64)> {
        self.fail()
    }

    async fn get_txs(&self) -> Result<Vec<Tx>> {
        self.fail()
    }

    async fn execute_txs(&self, _: Vec<Tx>, _: u64, _: DateTime<Utc>, _: Hash) -> Result<(Hash, u64)> {
        self.fail()
    }

    async fn set_final(&self, _: u64) -> Result<()> {
        self.fail()
    }
}

/// Engine that never responds, for timeout coverage. Counts how often it
/// was reached before hanging.
pub struct PendingExecutor {
    pub reached: AtomicUsize,
}

impl PendingExecutor {
    pub fn new() -> Self {
        Self {
            reached: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Executor for PendingExecutor {
    async fn init_chain(&self, _: DateTime<Utc>, _: u64, _: &str) -> Result<(Hash, u64)> {
        self.reached.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }

    async fn get_txs(&self) -> Result<Vec<Tx>> {
        self.reached.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }

    async fn execute_txs(&self, _: Vec<Tx>, _: u64, _: DateTime<Utc>, _: Hash) -> Result<(Hash, u64)> {
        self.reached.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }

    async fn set_final(&self, _: u64) -> Result<()> {
        self.reached.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

/// Starts a binary server on an ephemeral port and returns its target.
pub async fn start_binary_server(executor: Arc<dyn Executor>, config: ProxyConfig) -> String {
    let server = BinaryServer::bind(executor, config, "127.0.0.1:0")
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.serve());
    addr.to_string()
}

/// Starts a JSON-RPC server on an ephemeral port and returns its target
/// URL.
pub async fn start_jsonrpc_server(executor: Arc<dyn Executor>, config: ProxyConfig) -> String {
    let server = JsonRpcServer::bind(executor, config, "127.0.0.1:0")
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.serve());
    format!("http://{}", addr)
}
