//! Transport Plumbing
//!
//! Shared building blocks for the two wire transports:
//!
//! - **[`BinaryCodec`]**: postcard encoding of the binary envelope
//! - **[`framing`]**: length-prefixed TCP frames for the binary transport
//! - **[`HttpTransport`]**: HTTP/JSON-RPC conversion for the text transport

pub mod codec;
pub mod framing;
pub mod http;

pub use codec::BinaryCodec;
pub use http::{HttpTransport, HyperRequest, HyperResponse};
