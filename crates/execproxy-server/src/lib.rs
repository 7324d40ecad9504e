//! Transport servers exposing a local block-execution engine.
//!
//! Two servers with an identical surface, one per wire protocol:
//!
//! - [`BinaryServer`]: length-prefixed postcard frames over TCP
//! - [`JsonRpcServer`]: JSON-RPC 2.0 over HTTP/1.1
//!
//! Each is constructed from an [`execproxy_common::Executor`] plus a
//! [`execproxy_common::ProxyConfig`], holds the engine only by reference,
//! and handles every inbound request on its own task. The engine must
//! therefore tolerate concurrent invocation.

pub mod binary;
pub mod jsonrpc;
pub mod service;

pub use binary::BinaryServer;
pub use jsonrpc::JsonRpcServer;
pub use service::ExecutorService;
