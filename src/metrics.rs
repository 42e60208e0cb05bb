//! Prometheus wiring: recorder install, scrape series registration, and the
//! /metrics route.

use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and register every series the scrape
    /// pipeline emits, so /metrics lists them before the first tick.
    pub fn init(scrape_interval_secs: u64) -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("prometheus: install recorder");

        describe_scrape_series();
        gauge!("scrape_interval_secs").set(scrape_interval_secs as f64);

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe_scrape_series() {
    describe_counter!("scrape_records_total", "Price records extracted.");
    describe_counter!("scrape_errors_total", "Failed commodity scrapes.");
    describe_counter!(
        "scrape_contract_errors_total",
        "Failed futures contract endpoints (skipped, not fatal)."
    );
    describe_counter!(
        "scrape_skipped_total",
        "Records skipped as duplicates by the store."
    );
    describe_counter!("scrape_runs_total", "Completed scheduler ticks.");
    describe_histogram!("scrape_ms", "Fetch+extract time per commodity, ms.");
    describe_gauge!("scrape_last_run_ts", "Unix ts of the last scrape tick.");
    describe_gauge!(
        "scrape_interval_secs",
        "Configured seconds between scrape ticks."
    );
}
