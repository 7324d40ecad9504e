use crate::protocol::error::Result;
use crate::protocol::{Request, Response};

/// Codec for the binary transport's envelope messages.
///
/// Messages are serialized with postcard, a compact non-self-describing
/// format; both peers share the message definitions in
/// [`crate::protocol::messages`], so no schema travels on the wire.
///
/// # Example
///
/// ```
/// use execproxy_common::transport::BinaryCodec;
/// use execproxy_common::protocol::{Request, RequestBody};
/// use execproxy_common::protocol::messages::SetFinalRequest;
///
/// let request = Request::new(RequestBody::SetFinal(SetFinalRequest { block_height: 3 }));
/// let encoded = BinaryCodec::encode_request(&request).unwrap();
/// let decoded = BinaryCodec::decode_request(&encoded).unwrap();
/// assert_eq!(request, decoded);
/// ```
pub struct BinaryCodec;

impl BinaryCodec {
    /// Encode a request envelope to bytes.
    pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
        Ok(postcard::to_allocvec(request)?)
    }

    /// Decode a request envelope from bytes.
    pub fn decode_request(data: &[u8]) -> Result<Request> {
        Ok(postcard::from_bytes(data)?)
    }

    /// Encode a response envelope to bytes.
    pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
        Ok(postcard::to_allocvec(response)?)
    }

    /// Decode a response envelope from bytes.
    pub fn decode_response(data: &[u8]) -> Result<Response> {
        Ok(postcard::from_bytes(data)?)
    }
}
