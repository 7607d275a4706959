use axum::{
    Extension,
    extract::OriginalUri,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::pool::HttpPool;
use super::protocol::{
    CONTENT_TYPE_BINARY, HOPS_HEADER, MAX_HOPS, PeerResponse, encode_response, parse_request_path,
};
use crate::error::CacheError;
use crate::group::registry::get_group;

/// Answers `GET <base_path><group>/<key>` on behalf of this node's local groups.
///
/// The lookup goes through [`Group::get_local`](crate::group::group::Group::get_local), which
/// never consults the peer picker, so a peer request is never forwarded again.
pub async fn handle_peer_get(
    Extension(pool): Extension<Arc<HttpPool>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Response {
    tracing::info!("[Server {}] GET {}", pool.self_addr(), uri.path());

    let hops = headers
        .get(HOPS_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(0);
    if hops > MAX_HOPS {
        tracing::error!("Rejecting peer request after {} hops: {}", hops, uri.path());
        return error_response(&CacheError::HopLimit(hops));
    }

    let request = match parse_request_path(pool.base_path(), uri.path()) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Malformed peer request: {}", e);
            return error_response(&e);
        }
    };

    let Some(group) = get_group(&request.group) else {
        return error_response(&CacheError::GroupNotFound(request.group));
    };

    match group.get_local(&request.key).await {
        Ok(view) => {
            let body = encode_response(&PeerResponse {
                value: view.byte_slice(),
            });
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, CONTENT_TYPE_BINARY)],
                body,
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to serve {}/{}: {}", request.group, request.key, e);
            error_response(&e)
        }
    }
}

pub(crate) fn status_for(error: &CacheError) -> StatusCode {
    match error {
        CacheError::EmptyKey | CacheError::MalformedPath(_) => StatusCode::BAD_REQUEST,
        CacheError::GroupNotFound(_) => StatusCode::NOT_FOUND,
        CacheError::HopLimit(_) => StatusCode::LOOP_DETECTED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &CacheError) -> Response {
    (status_for(error), error.to_string()).into_response()
}
