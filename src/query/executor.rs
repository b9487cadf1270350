use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{Connection, OpenFlags, Row, named_params};
use std::time::Duration;
use time::Date;

use super::sql::{ORDERS_PAGE, SALES_PAGE};
use super::{QueryError, QueryKind, RecordSource};
use crate::config::DatabaseConfig;
use crate::model::{DateRange, OrderRecord, PageRequest, SalesRecord};
use crate::utils::{format_date, parse_stored_date};

/// Runs the page queries against a SQLite database.
///
/// Every call opens its own read-only connection and closes it when done;
/// nothing is pooled or shared between callers.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    config: DatabaseConfig,
}

impl SqliteExecutor {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    fn connect(&self) -> Result<Connection, QueryError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
            | OpenFlags::SQLITE_OPEN_URI;
        let conn = Connection::open_with_flags(&self.config.path, flags)
            .map_err(|e| QueryError::Connect(format!("{}: {}", self.config.path, e)))?;
        conn.busy_timeout(Duration::from_millis(self.config.busy_timeout_ms))
            .map_err(|e| QueryError::Connect(e.to_string()))?;
        Ok(conn)
    }

    /// Blocking fetch of one page of the sales view.
    pub fn fetch_sales(
        &self,
        range: DateRange,
        page: PageRequest,
    ) -> Result<Vec<SalesRecord>, QueryError> {
        let result = self.run(QueryKind::Sales, SALES_PAGE, range, page, sales_from_row);
        log_outcome(QueryKind::Sales, range, page, result)
    }

    /// Blocking fetch of one page of zero-bonus order headers.
    pub fn fetch_orders(
        &self,
        range: DateRange,
        page: PageRequest,
    ) -> Result<Vec<OrderRecord>, QueryError> {
        let result = self
            .run(QueryKind::Orders, ORDERS_PAGE, range, page, order_from_row)
            .map(|mut records| {
                let fetched = records.len();
                records.retain(OrderRecord::is_qualifying);
                if records.len() != fetched {
                    tracing::warn!(
                        "dropped {} bonus orders that passed the SQL filter",
                        fetched - records.len()
                    );
                }
                records
            });
        log_outcome(QueryKind::Orders, range, page, result)
    }

    fn run<T, F>(
        &self,
        kind: QueryKind,
        sql: &str,
        range: DateRange,
        page: PageRequest,
        map_row: F,
    ) -> Result<Vec<T>, QueryError>
    where
        F: Fn(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.connect()?;
        let execute = |e: rusqlite::Error| QueryError::Execute {
            kind,
            message: e.to_string(),
        };

        let mut stmt = conn.prepare(sql).map_err(execute)?;
        let start = format_date(range.start());
        let end = format_date(range.end());
        let offset = to_sql_int(page.offset());
        let limit = to_sql_int(page.limit());
        let rows = stmt
            .query_map(
                named_params! {
                    ":data_inicial": start,
                    ":data_final": end,
                    ":offset": offset,
                    ":limit": limit,
                },
                map_row,
            )
            .map_err(execute)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|e| row_error(kind, e))?);
        }
        Ok(records)
    }
}

#[async_trait]
impl RecordSource for SqliteExecutor {
    async fn sales(
        &self,
        range: DateRange,
        page: PageRequest,
    ) -> Result<Vec<SalesRecord>, QueryError> {
        let executor = self.clone();
        tokio::task::spawn_blocking(move || executor.fetch_sales(range, page))
            .await
            .map_err(|e| QueryError::Worker(e.to_string()))?
    }

    async fn orders(
        &self,
        range: DateRange,
        page: PageRequest,
    ) -> Result<Vec<OrderRecord>, QueryError> {
        let executor = self.clone();
        tokio::task::spawn_blocking(move || executor.fetch_orders(range, page))
            .await
            .map_err(|e| QueryError::Worker(e.to_string()))?
    }
}

fn sales_from_row(row: &Row<'_>) -> rusqlite::Result<SalesRecord> {
    Ok(SalesRecord {
        description: row.get(0)?,
        product_code: row.get(1)?,
        date: stored_date(row, 2)?,
        quantity: row.get(3)?,
        sale_price: row.get(4)?,
        fin_cost: row.get(5)?,
    })
}

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<OrderRecord> {
    Ok(OrderRecord {
        order_number: row.get(0)?,
        order_date: stored_date(row, 1)?,
        total_value: row.get(2)?,
        bonus_value: row.get(3)?,
        salesperson_name: row.get(4)?,
        branch_code: row.get(5)?,
        market_code: row.get(6)?,
        customer_code: row.get(7)?,
    })
}

fn stored_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<Date> {
    let text: String = row.get(idx)?;
    parse_stored_date(&text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("invalid date {text:?}").into(),
        )
    })
}

// SQLite integers are signed; row numbers never get near the top of i64
fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn row_error(kind: QueryKind, e: rusqlite::Error) -> QueryError {
    match e {
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => QueryError::Decode {
            kind,
            message: e.to_string(),
        },
        other => QueryError::Execute {
            kind,
            message: other.to_string(),
        },
    }
}

fn log_outcome<T>(
    kind: QueryKind,
    range: DateRange,
    page: PageRequest,
    result: Result<Vec<T>, QueryError>,
) -> Result<Vec<T>, QueryError> {
    match &result {
        Ok(records) => tracing::debug!(
            "{} query for {} page {} (size {}) returned {} rows",
            kind,
            range,
            page.page(),
            page.size(),
            records.len()
        ),
        Err(e) => tracing::error!("{} query for {} failed: {}", kind, range, e),
    }
    result
}
