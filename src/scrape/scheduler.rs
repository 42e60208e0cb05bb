// src/scrape/scheduler.rs
use std::sync::Arc;

use metrics::counter;
use tokio::task::JoinHandle;

use crate::scrape::{run_once, ScrapeDeps};
use crate::store::PriceStore;

#[derive(Clone, Copy, Debug)]
pub struct ScrapeSchedulerCfg {
    pub interval_secs: u64,
}

/// Spawn the periodic scrape tick. Each tick scrapes every configured
/// commodity independently; a failing commodity never stops the loop.
pub fn spawn_scrape_scheduler(
    cfg: ScrapeSchedulerCfg,
    commodities: Vec<String>,
    deps: Arc<ScrapeDeps>,
    store: Arc<PriceStore>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        // interval() panics on a zero period; config clamps too, but direct
        // callers get the same floor.
        let period = std::time::Duration::from_secs(cfg.interval_secs.max(1));
        let mut ticker = tokio::time::interval(period);
        // The first tick fires immediately; main already ran the startup
        // scrape, so skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let summary = run_once(&commodities, &deps, &store).await;
            counter!("scrape_runs_total").increment(1);
            tracing::info!(
                target: "scrape",
                inserted = summary.inserted,
                skipped = summary.skipped,
                errors = summary.errors,
                "scrape tick"
            );
        }
    })
}
