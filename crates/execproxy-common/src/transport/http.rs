//! HTTP Transport Utilities
//!
//! Conversion helpers between HTTP messages and the JSON-RPC envelope used
//! by protocol B. Shared by the JSON-RPC client and server.

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response, StatusCode};

use crate::protocol::error::ProxyError;
use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};

/// Type alias for hyper incoming requests.
pub type HyperRequest = Request<Incoming>;

/// Type alias for hyper responses with a full body.
pub type HyperResponse = Response<Full<Bytes>>;

pub struct HttpTransport;

impl HttpTransport {
    /// Parses a JSON-RPC request from an HTTP body.
    pub fn parse_jsonrpc(body: &[u8]) -> Result<JsonRpcRequest, ProxyError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Wraps a JSON-RPC response into an HTTP 200 response.
    ///
    /// JSON-RPC failures still travel as HTTP 200; the error object inside
    /// the envelope is the source of truth.
    pub fn to_http_response(jsonrpc: JsonRpcResponse) -> HyperResponse {
        let body = serde_json::to_vec(&jsonrpc).unwrap_or_default();

        Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body)))
            .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
    }

    /// Wraps a JSON-RPC error into an HTTP response.
    pub fn to_http_error(id: serde_json::Value, error: JsonRpcError) -> HyperResponse {
        Self::to_http_response(JsonRpcResponse::error(id, error))
    }
}
