pub mod error;
pub mod jsonrpc;
pub mod messages;


pub use error::{ProxyError, Result};
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use messages::{Request, RequestBody, RequestId, Response, ResponseBody, WireError};

/// Method names shared by both transports.
pub const METHOD_INIT_CHAIN: &str = "init_chain";
pub const METHOD_GET_TXS: &str = "get_txs";
pub const METHOD_EXECUTE_TXS: &str = "execute_txs";
pub const METHOD_SET_FINAL: &str = "set_final";
