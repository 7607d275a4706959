//! Front-end API
//!
//! A minimal HTTP surface for clients of a node: `GET /api?key=<key>` returns the raw value,
//! `GET /api/stats` returns the counters of every group as JSON.

use axum::{
    Extension, Json, Router,
    extract::Query,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;

use super::group::Group;
use super::registry::{get_group, group_names};
use super::types::GroupStats;
use crate::peers::handlers::status_for;
use crate::peers::protocol::CONTENT_TYPE_BINARY;

#[derive(Debug, Deserialize)]
pub struct ApiParams {
    #[serde(default)]
    pub key: String,
}

pub fn api_router(group: Arc<Group>) -> Router {
    Router::new()
        .route("/api", get(handle_api_get))
        .route("/api/stats", get(handle_stats))
        .layer(Extension(group))
}

pub async fn handle_api_get(
    Extension(group): Extension<Arc<Group>>,
    Query(params): Query<ApiParams>,
) -> Response {
    match group.get(&params.key).await {
        Ok(view) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, CONTENT_TYPE_BINARY)],
            view.into_bytes(),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("API get '{}' failed: {}", params.key, e);
            (status_for(&e), e.to_string()).into_response()
        }
    }
}

pub async fn handle_stats() -> Json<Vec<GroupStats>> {
    let stats = group_names()
        .iter()
        .filter_map(|name| get_group(name))
        .map(|group| group.stats())
        .collect();
    Json(stats)
}
