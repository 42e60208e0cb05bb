//! Agricultural price tracker binary entrypoint.
//! Boots the Axum HTTP server and the background scrape scheduler.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agprice_tracker::api::{self, AppState};
use agprice_tracker::metrics::Metrics;
use agprice_tracker::scrape::config::ScrapeConfig;
use agprice_tracker::scrape::scheduler::{spawn_scrape_scheduler, ScrapeSchedulerCfg};
use agprice_tracker::scrape::{self, ScrapeDeps};
use agprice_tracker::store::PriceStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("agprice_tracker=info,scrape=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = ScrapeConfig::load().context("loading scrape config")?;
    let metrics = Metrics::init(cfg.interval_secs);

    let store = Arc::new(PriceStore::with_capacity(5_000));
    let deps = Arc::new(ScrapeDeps::live().context("building scrape collaborators")?);

    // Startup scrape so /prices has data before the first scheduled tick.
    let summary = scrape::run_once(&cfg.commodities, &deps, &store).await;
    tracing::info!(
        inserted = summary.inserted,
        skipped = summary.skipped,
        errors = summary.errors,
        "startup scrape finished"
    );

    spawn_scrape_scheduler(
        ScrapeSchedulerCfg {
            interval_secs: cfg.interval_secs,
        },
        cfg.commodities.clone(),
        deps.clone(),
        store.clone(),
    );

    let router = api::create_router(AppState { store }).merge(metrics.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "serving price API");
    axum::serve(listener, router).await.context("serving")?;

    Ok(())
}
