//! Domain Value Types and Wire Conversions
//!
//! This module defines the values exchanged with an execution engine and the
//! pure conversions between those values and their wire representations.
//!
//! # Wire Representations
//!
//! - **[`Hash`]**: raw bytes on the wire, exactly 32 bytes in the domain.
//!   [`hash_from_wire`] copies at most 32 bytes and zero-pads short buffers.
//! - **`Tx`**: opaque bytes, carried verbatim in both directions.
//! - **Timestamps**: signed 64-bit Unix seconds on the wire. Encoding
//!   truncates sub-second precision; decoding is exact given the integer.
//!
//! # Example
//!
//! ```
//! use execproxy_common::types::{hash_from_wire, Hash};
//!
//! // Short buffers are zero-padded on the right.
//! let mut expected = [0u8; 32];
//! expected[..3].copy_from_slice(&[1, 2, 3]);
//! assert_eq!(hash_from_wire(&[1, 2, 3]), Hash::from(expected));
//! ```

use chrono::{DateTime, TimeZone, Utc};

use crate::protocol::error::{ProxyError, Result};

/// Length of a state root digest in bytes.
pub const HASH_SIZE: usize = 32;

/// A fixed-size digest summarizing chain state.
///
/// Always exactly [`HASH_SIZE`] bytes and immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// Returns the digest as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the wire form of the digest.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl From<[u8; HASH_SIZE]> for Hash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// An opaque, order-significant transaction payload.
///
/// The proxy layer never interprets transaction contents.
pub type Tx = Vec<u8>;

/// Builds a [`Hash`] from a wire buffer.
///
/// Copies at most [`HASH_SIZE`] bytes; shorter buffers are zero-padded on
/// the right, longer buffers contribute only their first 32 bytes. This can
/// never fail, so malformed hash bytes are impossible by construction.
pub fn hash_from_wire(bytes: &[u8]) -> Hash {
    let mut out = [0u8; HASH_SIZE];
    let n = bytes.len().min(HASH_SIZE);
    out[..n].copy_from_slice(&bytes[..n]);
    Hash(out)
}

/// Encodes a timestamp as whole Unix seconds, truncating toward negative
/// infinity. Sub-second precision is lost here and only here.
pub fn unix_seconds(t: &DateTime<Utc>) -> i64 {
    t.timestamp()
}

/// Decodes whole Unix seconds back into a timestamp.
///
/// Exact for every value produced by [`unix_seconds`]. Seconds outside the
/// representable range are a transport-level decode failure.
pub fn timestamp_from_unix(secs: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| ProxyError::Decode(format!("timestamp out of range: {}", secs)))
}
