use anyhow::Context;
use clap::Parser;
use std::sync::Arc;

use crate::config;
use crate::query::{RecordSource, SqliteExecutor};
use crate::refresh::Refresher;
use crate::refresh::cache::SnapshotCache;
use crate::server::Args;
use crate::server::http::{AppState, server};
use crate::utils;

pub async fn run_server() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Err(e) = utils::init_tracing() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cfg = config::load(&args.config)?;
    tracing::debug!("config: {:?}", cfg);
    tracing::info!("Using database {}", cfg.database.path);

    let source: Arc<dyn RecordSource> = Arc::new(SqliteExecutor::new(cfg.database.clone()));
    let cache = Arc::new(SnapshotCache::new());

    // the first refresh completes before the server starts answering
    let refresher = Arc::new(Refresher::new(
        source.clone(),
        cache.clone(),
        cfg.refresh.clone(),
    ));
    let refresh_task = refresher.start().await;

    let state = AppState::new(source, cache, cfg.paging.clone());
    let result = server::start(&cfg.http.listen_addr, state, shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("HTTP server on {} failed", cfg.http.listen_addr));

    refresh_task.abort();
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping");
}
