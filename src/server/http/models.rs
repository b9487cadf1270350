//! HTTP API request and response models

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::ApiError;
use crate::config::PagingConfig;
use crate::model::{DateRange, OrderRecord, PageRequest, SalesRecord};
use crate::refresh::cache::Snapshot;
use crate::utils::parse_date;

/// Query string shared by both data endpoints.
///
/// Every field is kept as raw text so that each validation failure can be
/// answered with its own message instead of a generic extractor rejection.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RangeParams {
    pub data_inicial: Option<String>,
    pub data_final: Option<String>,
    pub pagina: Option<String>,
    pub limite: Option<String>,
}

impl RangeParams {
    pub fn validate(&self, paging: &PagingConfig) -> Result<(DateRange, PageRequest), ApiError> {
        let (start, end) = match (non_empty(&self.data_inicial), non_empty(&self.data_final)) {
            (Some(start), Some(end)) => (start, end),
            _ => return Err(ApiError::MissingDates),
        };
        let start = parse_date(start).ok_or(ApiError::InvalidDate)?;
        let end = parse_date(end).ok_or(ApiError::InvalidDate)?;
        let range = DateRange::new(start, end)?;

        let page = parse_number("pagina", &self.pagina)?.unwrap_or(1);
        let requested = parse_number("limite", &self.limite)?;
        let size = paging
            .page_size(requested)
            .ok_or_else(|| ApiError::PageSizeTooLarge {
                value: requested.unwrap_or_default(),
                max: paging.max_page_size,
            })?;
        let page = PageRequest::new(page, size)?;

        Ok((range, page))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_number(name: &'static str, value: &Option<String>) -> Result<Option<u32>, ApiError> {
    match non_empty(value) {
        None => Ok(None),
        Some(text) => text
            .parse::<u32>()
            .map(Some)
            .map_err(|_| ApiError::InvalidNumber {
                name,
                value: text.to_string(),
            }),
    }
}

/// Body of `GET /snapshots`.
#[derive(Serialize, Debug, Clone)]
pub struct SnapshotsResponse {
    pub dados_vwsomelier: Arc<Snapshot<SalesRecord>>,
    pub dados_pcpedc: Arc<Snapshot<OrderRecord>>,
}
