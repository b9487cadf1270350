//! HTTP request handlers

use axum::{
    extract::{Query, State},
    response::Json,
};
use std::sync::Arc;

use super::error::ApiError;
use super::models::{RangeParams, SnapshotsResponse};
use crate::config::PagingConfig;
use crate::model::{OrderRecord, SalesRecord};
use crate::query::RecordSource;
use crate::refresh::cache::SnapshotCache;

/// Shared state for the HTTP server
#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn RecordSource>,
    cache: Arc<SnapshotCache>,
    paging: PagingConfig,
}

impl AppState {
    pub fn new(
        source: Arc<dyn RecordSource>,
        cache: Arc<SnapshotCache>,
        paging: PagingConfig,
    ) -> Self {
        Self {
            source,
            cache,
            paging,
        }
    }
}

/// Health check endpoint
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "salesfeed"
    }))
}

/// `GET /dados_vwsomelier`: one page of the sales view, queried live.
pub async fn sales(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<SalesRecord>>, ApiError> {
    let (range, page) = params.validate(&state.paging)?;
    let records = state.source.sales(range, page).await?;
    if records.is_empty() {
        return Err(ApiError::NoData);
    }
    Ok(Json(records))
}

/// `GET /dados_pcpedc`: one page of zero-bonus orders, queried live.
pub async fn orders(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<OrderRecord>>, ApiError> {
    let (range, page) = params.validate(&state.paging)?;
    let records = state.source.orders(range, page).await?;
    if records.is_empty() {
        return Err(ApiError::NoData);
    }
    Ok(Json(records))
}

/// `GET /snapshots`: the latest refresher output for both record types.
pub async fn snapshots(State(state): State<AppState>) -> Result<Json<SnapshotsResponse>, ApiError> {
    match (state.cache.sales(), state.cache.orders()) {
        (Some(dados_vwsomelier), Some(dados_pcpedc)) => Ok(Json(SnapshotsResponse {
            dados_vwsomelier,
            dados_pcpedc,
        })),
        _ => Err(ApiError::SnapshotUnavailable),
    }
}
