//! Peer Network Protocol
//!
//! Defines the wire messages and the request path shape used between cache nodes.
//!
//! A node asks a peer for `GET <base_path><group>/<key>` with both segments
//! percent-encoded. A successful answer is a protobuf-encoded [`PeerResponse`]; failures
//! carry a plain-text diagnostic instead.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use prost::Message;

use crate::error::{CacheError, CacheResult};

/// Header marking a request as peer traffic, carrying its node-to-node hop count.
///
/// A node answers peer requests from its own loader and never relays them, so every request
/// it sends carries exactly [`MAX_HOPS`]. A larger count can only come from a node that relays
/// peer requests, and is refused.
pub const HOPS_HEADER: &str = "x-gencache-hops";
pub const MAX_HOPS: u32 = 1;
pub const CONTENT_TYPE_BINARY: &str = "application/octet-stream";

/// Everything except unreserved characters is escaped, `/` included.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

// --- Wire Messages ---

#[derive(Clone, PartialEq, Message)]
pub struct PeerRequest {
    #[prost(string, tag = "1")]
    pub group: String,
    #[prost(string, tag = "2")]
    pub key: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct PeerResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub value: Vec<u8>,
}

impl PeerRequest {
    pub fn new(group: &str, key: &str) -> Self {
        Self {
            group: group.to_string(),
            key: key.to_string(),
        }
    }
}

pub fn encode_response(response: &PeerResponse) -> Vec<u8> {
    response.encode_to_vec()
}

pub fn decode_response(body: &[u8]) -> CacheResult<PeerResponse> {
    PeerResponse::decode(body).map_err(|e| CacheError::Codec(format!("decoding response body: {}", e)))
}

pub fn encode_request(request: &PeerRequest) -> Vec<u8> {
    request.encode_to_vec()
}

pub fn decode_request(body: &[u8]) -> CacheResult<PeerRequest> {
    PeerRequest::decode(body).map_err(|e| CacheError::Codec(format!("decoding request body: {}", e)))
}

// --- Paths ---

/// Builds `<group>/<key>` with each segment escaped, to be appended to a base URL.
pub fn request_path(request: &PeerRequest) -> String {
    format!(
        "{}/{}",
        utf8_percent_encode(&request.group, SEGMENT),
        utf8_percent_encode(&request.key, SEGMENT)
    )
}

/// Splits a raw request path into its decoded group and key.
///
/// The remainder after `base_path` must be exactly two non-empty segments.
pub fn parse_request_path(base_path: &str, path: &str) -> CacheResult<PeerRequest> {
    let rest = path
        .strip_prefix(base_path)
        .ok_or_else(|| CacheError::MalformedPath(format!("unexpected path: {}", path)))?;

    let (group, key) = match rest.split_once('/') {
        Some((group, key)) if !group.is_empty() && !key.is_empty() && !key.contains('/') => {
            (group, key)
        }
        _ => return Err(CacheError::MalformedPath(path.to_string())),
    };

    Ok(PeerRequest {
        group: decode_segment(group)?,
        key: decode_segment(key)?,
    })
}

fn decode_segment(segment: &str) -> CacheResult<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| CacheError::MalformedPath(format!("invalid utf-8 in path: {}", e)))
}
