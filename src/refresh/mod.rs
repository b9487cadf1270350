//! Periodic snapshot refresh.
//!
//! Every tick re-runs both page queries over a trailing date window and
//! replaces the cached snapshots. A failed query still replaces its snapshot,
//! with no records and the error recorded.

pub mod cache;

use std::sync::Arc;
use std::time::Duration;
use time::{Date, OffsetDateTime, UtcOffset};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::config::RefreshConfig;
use crate::model::{DateRange, PageRequest};
use crate::query::{QueryError, QueryKind, RecordSource};
use cache::{Snapshot, SnapshotCache};

pub struct Refresher {
    source: Arc<dyn RecordSource>,
    cache: Arc<SnapshotCache>,
    config: RefreshConfig,
}

/// Outcome of a single tick, mostly useful for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    pub range: DateRange,
    pub sales_rows: Option<usize>,
    pub order_rows: Option<usize>,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.sales_rows.is_some() && self.order_rows.is_some()
    }
}

impl Refresher {
    pub fn new(
        source: Arc<dyn RecordSource>,
        cache: Arc<SnapshotCache>,
        config: RefreshConfig,
    ) -> Self {
        Self {
            source,
            cache,
            config,
        }
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(self.config.interval_secs.max(1))
    }

    /// Calendar date of `now` at the configured UTC offset.
    ///
    /// With the default offset of zero this is the UTC date.
    pub fn today_at(&self, now: OffsetDateTime) -> Date {
        let offset = UtcOffset::from_hms(self.config.utc_offset_hours, 0, 0).unwrap_or_else(|e| {
            tracing::warn!("invalid refresh UTC offset, using UTC: {}", e);
            UtcOffset::UTC
        });
        now.to_offset(offset).date()
    }

    /// Refresh both snapshots for the window ending today, as seen at the
    /// configured UTC offset.
    pub async fn refresh_once(&self) -> RefreshReport {
        self.refresh_for(self.today_at(OffsetDateTime::now_utc())).await
    }

    /// Refresh both snapshots for the window ending on `today`.
    pub async fn refresh_for(&self, today: Date) -> RefreshReport {
        let range = DateRange::trailing(today, self.config.window_days);
        let page = match PageRequest::new(1, self.config.page_size) {
            Ok(page) => page,
            Err(e) => {
                tracing::error!("invalid refresh page size: {}", e);
                return RefreshReport {
                    range,
                    sales_rows: None,
                    order_rows: None,
                };
            }
        };

        tracing::info!("Refreshing snapshots for {}", range);

        let sales = self.source.sales(range, page).await;
        let sales_rows = outcome(QueryKind::Sales, &sales);
        self.cache.replace_sales(snapshot(range, page, sales));

        let orders = self.source.orders(range, page).await;
        let order_rows = outcome(QueryKind::Orders, &orders);
        self.cache.replace_orders(snapshot(range, page, orders));

        RefreshReport {
            range,
            sales_rows,
            order_rows,
        }
    }

    /// Run one refresh now, then keep refreshing every period in the
    /// background.
    ///
    /// The first background tick fires one full period after this call
    /// returns. A tick that runs long delays the next one; ticks are never
    /// queued up behind it.
    pub async fn start(self: Arc<Self>) -> JoinHandle<()> {
        let report = self.refresh_once().await;
        tracing::info!(
            "Initial refresh done (complete: {})",
            report.is_complete()
        );

        let period = self.period();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!("Snapshot refresher started, interval {:?}", period);
        tokio::spawn(async move {
            loop {
                ticker.tick().await;
                let report = self.refresh_once().await;
                if report.is_complete() {
                    tracing::info!("Refresh job for {} executed successfully", report.range);
                } else {
                    tracing::warn!("Refresh job for {} finished with errors", report.range);
                }
            }
        })
    }
}

fn outcome<T>(kind: QueryKind, result: &Result<Vec<T>, QueryError>) -> Option<usize> {
    match result {
        Ok(records) => {
            tracing::debug!("{} snapshot: {} rows", kind, records.len());
            Some(records.len())
        }
        Err(e) => {
            tracing::warn!("{} snapshot refresh failed: {}", kind, e);
            None
        }
    }
}

fn snapshot<T>(
    range: DateRange,
    page: PageRequest,
    result: Result<Vec<T>, QueryError>,
) -> Snapshot<T> {
    let (records, error) = match result {
        Ok(records) => (records, None),
        Err(e) => (Vec::new(), Some(e.to_string())),
    };
    Snapshot {
        range,
        page,
        refreshed_at: OffsetDateTime::now_utc(),
        records,
        error,
    }
}
