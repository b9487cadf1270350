/// Tests of the periodic snapshot refresher
///
/// A scripted source stands in for the database so that calls can be
/// counted and failures injected; the tokio clock is paused and advanced
/// by hand.

use async_trait::async_trait;
use salesfeed::config::RefreshConfig;
use salesfeed::model::{DateRange, OrderRecord, PageRequest, SalesRecord};
use salesfeed::query::{QueryError, RecordSource};
use salesfeed::refresh::Refresher;
use salesfeed::refresh::cache::SnapshotCache;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use time::macros::{date, datetime};

#[derive(Default)]
struct ScriptedSource {
    sales_calls: AtomicUsize,
    order_calls: AtomicUsize,
    fail: AtomicBool,
    last_request: Mutex<Option<(DateRange, PageRequest)>>,
}

impl ScriptedSource {
    fn record(&self, range: DateRange, page: PageRequest) -> Result<(), QueryError> {
        *self.last_request.lock().unwrap() = Some((range, page));
        if self.fail.load(Ordering::SeqCst) {
            return Err(QueryError::Connect("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordSource for ScriptedSource {
    async fn sales(
        &self,
        range: DateRange,
        page: PageRequest,
    ) -> Result<Vec<SalesRecord>, QueryError> {
        self.sales_calls.fetch_add(1, Ordering::SeqCst);
        self.record(range, page)?;
        Ok(vec![SalesRecord {
            description: "VINHO TINTO".to_string(),
            product_code: 1,
            date: range.end(),
            quantity: Some(1.0),
            sale_price: Some(50.0),
            fin_cost: Some(30.0),
        }])
    }

    async fn orders(
        &self,
        range: DateRange,
        page: PageRequest,
    ) -> Result<Vec<OrderRecord>, QueryError> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);
        self.record(range, page)?;
        Ok(vec![OrderRecord {
            order_number: 1,
            order_date: range.start(),
            total_value: Some(100.0),
            bonus_value: 0.0,
            salesperson_name: Some("MARIA SOUZA".to_string()),
            branch_code: Some("1".to_string()),
            market_code: "CENTRO".to_string(),
            customer_code: Some(5001),
        }])
    }
}

fn refresher(source: Arc<ScriptedSource>) -> (Arc<Refresher>, Arc<SnapshotCache>) {
    let cache = Arc::new(SnapshotCache::new());
    let refresher = Refresher::new(source, cache.clone(), RefreshConfig::default());
    (Arc::new(refresher), cache)
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_start_refreshes_before_first_tick() {
    let source = Arc::new(ScriptedSource::default());
    let (refresher, cache) = refresher(source.clone());

    let handle = refresher.start().await;

    assert_eq!(source.sales_calls.load(Ordering::SeqCst), 1);
    assert_eq!(source.order_calls.load(Ordering::SeqCst), 1);
    assert!(cache.sales().is_some());
    assert!(cache.orders().is_some());

    handle.abort();
}

#[tokio::test(start_paused = true)]
async fn test_ticks_every_interval() {
    let source = Arc::new(ScriptedSource::default());
    let (refresher, _cache) = refresher(source.clone());

    let handle = refresher.start().await;
    settle().await;
    assert_eq!(source.sales_calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_secs(9)).await;
    settle().await;
    assert_eq!(source.sales_calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_secs(1)).await;
    settle().await;
    assert_eq!(source.sales_calls.load(Ordering::SeqCst), 2);
    assert_eq!(source.order_calls.load(Ordering::SeqCst), 2);

    tokio::time::advance(Duration::from_secs(10)).await;
    settle().await;
    assert_eq!(source.sales_calls.load(Ordering::SeqCst), 3);

    handle.abort();
}

#[tokio::test]
async fn test_trailing_window_and_page() {
    let source = Arc::new(ScriptedSource::default());
    let (refresher, cache) = refresher(source.clone());

    let report = refresher.refresh_for(date!(2024 - 03 - 10)).await;
    assert!(report.is_complete());
    assert_eq!(report.sales_rows, Some(1));
    assert_eq!(report.order_rows, Some(1));

    let (range, page) = source.last_request.lock().unwrap().unwrap();
    assert_eq!(range.start(), date!(2024 - 03 - 03));
    assert_eq!(range.end(), date!(2024 - 03 - 10));
    assert_eq!((page.page(), page.size()), (1, 10));

    let sales = cache.sales().unwrap();
    assert_eq!(sales.range, range);
    assert_eq!(sales.records.len(), 1);
    assert!(!sales.is_failed());
}

#[tokio::test]
async fn test_failure_replaces_snapshot_with_error() {
    let source = Arc::new(ScriptedSource::default());
    let (refresher, cache) = refresher(source.clone());

    refresher.refresh_for(date!(2024 - 03 - 10)).await;
    assert_eq!(cache.orders().unwrap().records.len(), 1);

    source.fail.store(true, Ordering::SeqCst);
    let report = refresher.refresh_for(date!(2024 - 03 - 11)).await;
    assert!(!report.is_complete());
    assert_eq!(report.sales_rows, None);

    let orders = cache.orders().unwrap();
    assert!(orders.records.is_empty());
    assert!(orders.is_failed());
    assert!(orders.error.as_deref().unwrap().contains("connection refused"));
    assert_eq!(orders.range.end(), date!(2024 - 03 - 11));
}

#[test]
fn test_today_follows_configured_offset() {
    let source = Arc::new(ScriptedSource::default());
    let cache = Arc::new(SnapshotCache::new());
    let now = datetime!(2024-03-10 01:30 UTC);

    let utc = Refresher::new(source.clone(), cache.clone(), RefreshConfig::default());
    assert_eq!(utc.today_at(now), date!(2024 - 03 - 10));

    let sao_paulo = Refresher::new(
        source,
        cache,
        RefreshConfig {
            utc_offset_hours: -3,
            ..RefreshConfig::default()
        },
    );
    assert_eq!(sao_paulo.today_at(now), date!(2024 - 03 - 09));
    assert_eq!(
        sao_paulo.today_at(datetime!(2024-03-10 03:00 UTC)),
        date!(2024 - 03 - 10)
    );
}
