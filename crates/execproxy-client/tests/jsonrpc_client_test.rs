//! JSON-RPC Client Integration Tests
//!
//! Drives `JsonRpcClient` against small in-process hyper servers, covering
//! envelope handling, error-code mapping and transport failures without a
//! full proxy server.

use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::json;
use tokio::net::TcpListener;

use execproxy_client::JsonRpcClient;
use execproxy_common::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use execproxy_common::{Executor, ProxyError};

/// Starts a hyper server that maps each decoded JSON-RPC request through
/// `respond`.
async fn start_scripted_server<F>(respond: F) -> String
where
    F: Fn(JsonRpcRequest) -> JsonRpcResponse + Send + Sync + Clone + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let io = TokioIo::new(stream);
            let respond = respond.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let respond = respond.clone();
                    async move {
                        let body = req.into_body().collect().await.unwrap().to_bytes();
                        let request: JsonRpcRequest = serde_json::from_slice(&body).unwrap();
                        let response = respond(request);

                        Ok::<_, hyper::Error>(
                            Response::builder()
                                .status(StatusCode::OK)
                                .header("Content-Type", "application/json")
                                .body(Full::new(Bytes::from(
                                    serde_json::to_vec(&response).unwrap(),
                                )))
                                .unwrap(),
                        )
                    }
                });

                let _ = http1::Builder::new().serve_connection(io, service).await;
            });
        }
    });

    format!("http://{}", addr)
}

/// Starts a hyper server that answers every request with a fixed raw body.
async fn start_raw_server(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let io = TokioIo::new(stream);

            tokio::spawn(async move {
                let service = service_fn(move |_req: Request<Incoming>| async move {
                    Ok::<_, hyper::Error>(
                        Response::builder()
                            .status(StatusCode::OK)
                            .header("Content-Type", "application/json")
                            .body(Full::new(Bytes::from(body)))
                            .unwrap(),
                    )
                });

                let _ = http1::Builder::new().serve_connection(io, service).await;
            });
        }
    });

    format!("http://{}", addr)
}

async fn started_client(target: &str) -> JsonRpcClient {
    let mut client = JsonRpcClient::new();
    client.start(target).await.unwrap();
    client
}

#[tokio::test]
async fn test_successful_response_is_decoded() {
    let target = start_scripted_server(|req| {
        assert_eq!(req.jsonrpc, "2.0");
        assert_eq!(req.method, "get_txs");
        JsonRpcResponse::success(req.id, json!({"txs": [[1, 2], [3]]}))
    })
    .await;

    let client = started_client(&target).await;
    let txs = client.get_txs().await.unwrap();

    assert_eq!(txs, vec![vec![1u8, 2], vec![3u8]]);
}

#[tokio::test]
async fn test_server_error_code_maps_to_executor_error() {
    let target = start_scripted_server(|req| {
        JsonRpcResponse::error(req.id, JsonRpcError::server_error("engine rejected block"))
    })
    .await;

    let client = started_client(&target).await;
    let result = client.get_txs().await;

    match result {
        Err(ProxyError::Executor(msg)) => assert_eq!(msg, "engine rejected block"),
        other => panic!("expected executor error, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_method_not_found_maps_to_decode_error() {
    let target =
        start_scripted_server(|req| JsonRpcResponse::error(req.id, JsonRpcError::method_not_found()))
            .await;

    let client = started_client(&target).await;
    let result = client.get_txs().await;

    match result {
        Err(ProxyError::Decode(msg)) => assert!(msg.contains("-32601")),
        other => panic!("expected decode error, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_malformed_response_body_is_json_error() {
    let target = start_raw_server("this is not json").await;

    let client = started_client(&target).await;
    let result = client.get_txs().await;

    assert!(matches!(result, Err(ProxyError::Json(_))));
}

#[tokio::test]
async fn test_missing_result_is_invalid_response() {
    let target = start_raw_server(r#"{"jsonrpc":"2.0","result":null,"error":null,"id":1}"#).await;

    let client = started_client(&target).await;
    let result = client.get_txs().await;

    assert!(matches!(result, Err(ProxyError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_start_against_dead_endpoint_fails() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let mut client = JsonRpcClient::new();
    let result = client.start(&format!("http://{}", addr)).await;

    assert!(matches!(result, Err(ProxyError::Connection(_))));
}

#[tokio::test]
async fn test_concurrent_calls_share_one_client() {
    let target = start_scripted_server(|req| JsonRpcResponse::success(req.id, json!({"txs": []})))
        .await;
    let client = Arc::new(started_client(&target).await);

    let tasks = (0..10)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.get_txs().await })
        })
        .collect::<Vec<_>>();

    for task in futures::future::join_all(tasks).await {
        assert!(task.unwrap().unwrap().is_empty());
    }
}
