use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

pub type RequestId = u64;

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Request body for `init_chain`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitChainRequest {
    /// Genesis time as whole Unix seconds.
    pub genesis_time: i64,
    pub initial_height: u64,
    pub chain_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitChainResponse {
    /// Genesis state root as raw bytes.
    pub state_root: Vec<u8>,
    pub max_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetTxsRequest {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetTxsResponse {
    /// Pending transactions, order-significant.
    pub txs: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteTxsRequest {
    /// Transactions to apply, order-significant.
    pub txs: Vec<Vec<u8>>,
    pub block_height: u64,
    /// Block time as whole Unix seconds.
    pub timestamp: i64,
    pub prev_state_root: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteTxsResponse {
    pub updated_state_root: Vec<u8>,
    pub max_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetFinalRequest {
    pub block_height: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetFinalResponse {}

/// The four executor operations as a closed set of request bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RequestBody {
    InitChain(InitChainRequest),
    GetTxs(GetTxsRequest),
    ExecuteTxs(ExecuteTxsRequest),
    SetFinal(SetFinalRequest),
}

impl RequestBody {
    /// Method name of this operation, shared with the JSON-RPC transport.
    pub fn method(&self) -> &'static str {
        match self {
            RequestBody::InitChain(_) => super::METHOD_INIT_CHAIN,
            RequestBody::GetTxs(_) => super::METHOD_GET_TXS,
            RequestBody::ExecuteTxs(_) => super::METHOD_EXECUTE_TXS,
            RequestBody::SetFinal(_) => super::METHOD_SET_FINAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResponseBody {
    InitChain(InitChainResponse),
    GetTxs(GetTxsResponse),
    ExecuteTxs(ExecuteTxsResponse),
    SetFinal(SetFinalResponse),
}

/// Failure carried back over the binary transport.
///
/// `Decode` failures originate in the transport layer; `Executor` failures
/// are the engine's own error text, passed through opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WireError {
    Decode(String),
    Executor(String),
}

/// Binary transport request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub body: RequestBody,
}

impl Request {
    pub fn new(body: RequestBody) -> Self {
        Request {
            id: REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed),
            body,
        }
    }
}

/// Binary transport response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: RequestId,
    pub result: Option<ResponseBody>,
    pub error: Option<WireError>,
}

impl Response {
    /// Creates a successful response for request `id`.
    pub fn success(id: RequestId, result: ResponseBody) -> Self {
        Response {
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Creates a failure response for request `id`.
    pub fn failure(id: RequestId, error: WireError) -> Self {
        Response {
            id,
            result: None,
            error: Some(error),
        }
    }
}
