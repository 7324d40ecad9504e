//! Transport clients for a remote block-execution engine.
//!
//! Two clients with an identical surface, one per wire protocol:
//!
//! - [`BinaryClient`]: length-prefixed postcard frames over TCP
//! - [`JsonRpcClient`]: JSON-RPC 2.0 over HTTP/1.1
//!
//! Both implement [`execproxy_common::Executor`], so a started client is a
//! drop-in engine for anything programmed against the contract. Swapping
//! one client for the other changes no observable behavior.

pub mod binary;
pub mod jsonrpc;

pub use binary::BinaryClient;
pub use jsonrpc::JsonRpcClient;
