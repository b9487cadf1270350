//! Paginated reads against the ERP database.
//!
//! Two fixed queries are supported: the `VW_SOMELIER` sales/cost view and
//! the `PCPEDC` order headers. Both take a [`DateRange`] and a
//! [`PageRequest`] and return rows ordered by date ascending.

pub mod executor;
pub mod sql;

use crate::model::{DateRange, OrderRecord, PageRequest, SalesRecord};
use async_trait::async_trait;
use std::fmt;

pub use executor::SqliteExecutor;

/// Identifies one of the two query templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Sales,
    Orders,
}

impl QueryKind {
    /// Name used for the matching HTTP route and snapshot key.
    pub fn name(&self) -> &'static str {
        match self {
            QueryKind::Sales => "dados_vwsomelier",
            QueryKind::Orders => "dados_pcpedc",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a query produced no rows.
///
/// An empty `Ok` vector means the range held no qualifying rows; every
/// variant here means the backend could not be asked.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("failed to connect to database: {0}")]
    Connect(String),

    #[error("failed to execute {kind} query: {message}")]
    Execute { kind: QueryKind, message: String },

    #[error("unexpected value in {kind} row: {message}")]
    Decode { kind: QueryKind, message: String },

    #[error("query worker failed: {0}")]
    Worker(String),
}

/// Source of paginated records.
///
/// Implemented by [`SqliteExecutor`]; the refresher and the HTTP handlers
/// only see this trait.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn sales(
        &self,
        range: DateRange,
        page: PageRequest,
    ) -> Result<Vec<SalesRecord>, QueryError>;

    async fn orders(
        &self,
        range: DateRange,
        page: PageRequest,
    ) -> Result<Vec<OrderRecord>, QueryError>;
}
