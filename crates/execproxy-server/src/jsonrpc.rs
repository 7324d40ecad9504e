//! JSON-RPC Transport Server
//!
//! Serves the four executor operations as JSON-RPC 2.0 methods over
//! HTTP/1.1. Each accepted connection runs on its own task. HTTP bodies are
//! unbounded-length input, so any request larger than the configured
//! `max_request_size` is rejected before it is decoded and before the
//! engine is ever invoked.

use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::BodyExt;
use hyper::header::CONTENT_LENGTH;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use execproxy_common::protocol::error::{ProxyError, Result};
use execproxy_common::protocol::messages::RequestBody;
use execproxy_common::protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, ResponseBody, METHOD_EXECUTE_TXS,
    METHOD_GET_TXS, METHOD_INIT_CHAIN, METHOD_SET_FINAL,
};
use execproxy_common::transport::{HttpTransport, HyperRequest, HyperResponse};
use execproxy_common::{Executor, ProxyConfig};

use crate::service::ExecutorService;

/// Routes JSON-RPC requests to the executor dispatch.
struct ExecutorRouter {
    service: ExecutorService,
}

impl ExecutorRouter {
    fn new(service: ExecutorService) -> Self {
        Self { service }
    }

    async fn handle(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        let body = match parse_body(&request.method, request.params) {
            Ok(body) => body,
            Err(error) => return JsonRpcResponse::error(id, error),
        };

        match self.service.dispatch(body).await {
            Ok(result) => match result_to_value(result) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(&e.to_string())),
            },
            Err(e) => JsonRpcResponse::error(id, rpc_error(e)),
        }
    }
}

fn parse_body(method: &str, params: Value) -> std::result::Result<RequestBody, JsonRpcError> {
    let body = match method {
        METHOD_INIT_CHAIN => RequestBody::InitChain(parse_params(params)?),
        METHOD_GET_TXS => RequestBody::GetTxs(parse_params(params)?),
        METHOD_EXECUTE_TXS => RequestBody::ExecuteTxs(parse_params(params)?),
        METHOD_SET_FINAL => RequestBody::SetFinal(parse_params(params)?),
        _ => return Err(JsonRpcError::method_not_found()),
    };
    Ok(body)
}

fn parse_params<T: serde::de::DeserializeOwned>(
    params: Value,
) -> std::result::Result<T, JsonRpcError> {
    serde_json::from_value(params).map_err(|e| JsonRpcError::invalid_params(&e.to_string()))
}

/// Serializes the bare body struct, not the enum wrapper, so clients read
/// the same field set on both transports.
fn result_to_value(result: ResponseBody) -> Result<Value> {
    let value = match result {
        ResponseBody::InitChain(r) => serde_json::to_value(r)?,
        ResponseBody::GetTxs(r) => serde_json::to_value(r)?,
        ResponseBody::ExecuteTxs(r) => serde_json::to_value(r)?,
        ResponseBody::SetFinal(r) => serde_json::to_value(r)?,
    };
    Ok(value)
}

/// Maps dispatch failures onto JSON-RPC error codes. Engine failures keep
/// their original text behind the server-error code.
fn rpc_error(e: ProxyError) -> JsonRpcError {
    match e {
        ProxyError::Executor(msg) => JsonRpcError::server_error(&msg),
        ProxyError::Decode(msg) => JsonRpcError::invalid_params(&msg),
        other => JsonRpcError::server_error(&other.to_string()),
    }
}

/// Server for the JSON-RPC transport.
pub struct JsonRpcServer {
    router: Arc<ExecutorRouter>,
    config: ProxyConfig,
    listener: TcpListener,
}

impl JsonRpcServer {
    /// Binds to `addr` and prepares to serve `executor`.
    pub async fn bind(executor: Arc<dyn Executor>, config: ProxyConfig, addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ProxyError::Connection(format!("failed to bind to {}: {}", addr, e)))?;

        Ok(Self {
            router: Arc::new(ExecutorRouter::new(ExecutorService::new(executor))),
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
        tracing::info!(addr = %self.local_addr()?, "jsonrpc server listening");
        let max_request_size = self.config.max_request_size;

        loop {
            let (stream, peer_addr) = self.listener.accept().await.map_err(|e| {
                ProxyError::Connection(format!("failed to accept connection: {}", e))
            })?;
            tracing::debug!(%peer_addr, "connection established");

            let io = TokioIo::new(stream);
            let router = self.router.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let router = router.clone();
                    async move { handle_request(router, max_request_size, req).await }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    tracing::error!(%peer_addr, "error serving connection: {}", e);
                }
            });
        }
    }
}

async fn handle_request(
    router: Arc<ExecutorRouter>,
    max_request_size: usize,
    req: HyperRequest,
) -> Result<HyperResponse> {
    if req.method() != hyper::Method::POST {
        return Ok(HttpTransport::to_http_error(
            json!(null),
            JsonRpcError::invalid_request("only POST requests are supported"),
        ));
    }

    // Refuse oversized requests as early as possible: first on the declared
    // length, then on the collected body, always before decoding.
    if let Some(declared) = declared_length(&req) {
        if declared > max_request_size {
            return Ok(HttpTransport::to_http_error(
                json!(null),
                JsonRpcError::request_too_large(max_request_size),
            ));
        }
    }

    let body = req
        .into_body()
        .collect()
        .await
        .map_err(|e| ProxyError::Connection(format!("failed to read request body: {}", e)))?
        .to_bytes();

    if body.len() > max_request_size {
        return Ok(HttpTransport::to_http_error(
            json!(null),
            JsonRpcError::request_too_large(max_request_size),
        ));
    }

    let request = match HttpTransport::parse_jsonrpc(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!("failed to parse JSON-RPC request: {}", e);
            return Ok(HttpTransport::to_http_error(
                json!(null),
                JsonRpcError::parse_error(),
            ));
        }
    };

    let response = router.handle(request).await;
    Ok(HttpTransport::to_http_response(response))
}

fn declared_length(req: &HyperRequest) -> Option<usize> {
    req.headers()
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
