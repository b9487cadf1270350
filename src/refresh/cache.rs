//! Snapshot cache management

use serde::Serialize;
use std::sync::{Arc, RwLock};
use time::OffsetDateTime;

use crate::model::{DateRange, OrderRecord, PageRequest, SalesRecord};
use crate::utils::serialize_timestamp;

/// Result of one refresh for one record type.
#[derive(Serialize, Debug, Clone)]
pub struct Snapshot<T> {
    #[serde(flatten)]
    pub range: DateRange,
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(rename = "atualizado_em", serialize_with = "serialize_timestamp")]
    pub refreshed_at: OffsetDateTime,
    #[serde(rename = "registros")]
    pub records: Vec<T>,
    /// Set when the query failed; `records` is then empty.
    #[serde(rename = "erro")]
    pub error: Option<String>,
}

impl<T> Snapshot<T> {
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Latest snapshots of both record types.
///
/// Each slot holds an `Arc` that is swapped whole on replace, so a reader
/// sees either the previous snapshot or the new one, never a mix.
#[derive(Default)]
pub struct SnapshotCache {
    sales: RwLock<Option<Arc<Snapshot<SalesRecord>>>>,
    orders: RwLock<Option<Arc<Snapshot<OrderRecord>>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_sales(&self, snapshot: Snapshot<SalesRecord>) {
        let mut slot = self.sales.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::new(snapshot));
    }

    pub fn replace_orders(&self, snapshot: Snapshot<OrderRecord>) {
        let mut slot = self.orders.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::new(snapshot));
    }

    /// Current sales snapshot, `None` until the first refresh completes.
    pub fn sales(&self) -> Option<Arc<Snapshot<SalesRecord>>> {
        self.sales.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Current orders snapshot, `None` until the first refresh completes.
    pub fn orders(&self) -> Option<Arc<Snapshot<OrderRecord>>> {
        self.orders.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
