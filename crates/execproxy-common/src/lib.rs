//! Shared core of the execproxy transports.
//!
//! This crate holds everything both wire transports depend on: the domain
//! value types and their wire conversions ([`types`]), the executor
//! contract ([`executor`]), the protocol envelopes ([`protocol`]), the
//! transport plumbing ([`transport`]) and the shared configuration
//! ([`config`]). The transports themselves live in `execproxy-client` and
//! `execproxy-server` and do not depend on each other.

pub mod config;
pub mod executor;
pub mod protocol;
pub mod transport;
pub mod types;

pub use config::ProxyConfig;
pub use executor::Executor;
pub use protocol::error::{ProxyError, Result};
pub use types::{Hash, Tx};
