// src/scrape/mod.rs
//! Extraction-and-normalization core: per-source extractors, unit/currency
//! conversion, record assembly, and the commodity dispatcher.

pub mod config;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod rates;
pub mod scheduler;
pub mod sources;
pub mod types;

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, gauge, histogram};

use crate::scrape::error::{ExtractionError, FetchError, ScrapeError};
use crate::scrape::fetch::{HttpFetcher, PageFetcher};
use crate::scrape::rates::{ExchangeRateApi, RateSource};
use crate::scrape::sources::{abares, barchart, cotlook, nsw_dpi, Extract};
use crate::scrape::types::{Clock, PriceRecord, SystemClock};
use crate::store::{InsertOutcome, PriceStore};

/// The supported commodity/source pairings. Adding one is a new variant here
/// plus an extractor under `sources/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Commodity {
    CotlookAIndex,
    CottonFutures,
    Wheat,
    Barley,
    Beef,
}

impl Commodity {
    pub const ALL: [Commodity; 5] = [
        Commodity::CotlookAIndex,
        Commodity::CottonFutures,
        Commodity::Wheat,
        Commodity::Barley,
        Commodity::Beef,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Commodity::CotlookAIndex => "cotlook_a_index",
            Commodity::CottonFutures => "cotton_futures",
            Commodity::Wheat => "wheat",
            Commodity::Barley => "barley",
            Commodity::Beef => "beef",
        }
    }

    /// Case-insensitive lookup over the fixed id set; unknown ids fail
    /// closed, naming the offending identifier.
    pub fn from_id(id: &str) -> Result<Self, ScrapeError> {
        let want = id.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.id() == want)
            .ok_or_else(|| ScrapeError::UnsupportedCommodity(id.trim().to_string()))
    }
}

/// External collaborators of the pipeline, injected so tests can run on
/// fixtures with a fixed clock and rate.
pub struct ScrapeDeps {
    pub fetcher: Arc<dyn PageFetcher>,
    pub rates: Arc<dyn RateSource>,
    pub clock: Arc<dyn Clock>,
}

impl ScrapeDeps {
    pub fn live() -> Result<Self, FetchError> {
        Ok(Self {
            fetcher: Arc::new(HttpFetcher::new()?),
            rates: Arc::new(ExchangeRateApi::new(reqwest::Client::new())),
            clock: Arc::new(SystemClock),
        })
    }
}

/// Dispatch a commodity id to its pipeline.
pub async fn dispatch(id: &str, deps: &ScrapeDeps) -> Result<Vec<PriceRecord>, ScrapeError> {
    scrape_commodity(Commodity::from_id(id)?, deps).await
}

/// Run one commodity's pipeline: fetch -> extract -> convert -> normalize.
/// Returns one record for every source except the futures curve, which
/// yields one per successfully scraped contract.
pub async fn scrape_commodity(
    commodity: Commodity,
    deps: &ScrapeDeps,
) -> Result<Vec<PriceRecord>, ScrapeError> {
    let t0 = Instant::now();

    let res = match commodity {
        Commodity::CotlookAIndex => scrape_cotlook(deps).await.map(|r| vec![r]),
        Commodity::CottonFutures => scrape_futures_curve(deps).await,
        Commodity::Wheat => scrape_grain(deps, "Wheat", "Wheat (H2)").await.map(|r| vec![r]),
        Commodity::Barley => scrape_grain(deps, "Barley", "Barley (feed)")
            .await
            .map(|r| vec![r]),
        Commodity::Beef => scrape_beef(deps).await.map(|r| vec![r]),
    };

    histogram!("scrape_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    if let Ok(records) = &res {
        counter!("scrape_records_total").increment(records.len() as u64);
    }
    res
}

/// Cotlook A Index: fixed-row extraction, USc/lb -> AUD $/bale, timestamped
/// with the published index date.
async fn scrape_cotlook(deps: &ScrapeDeps) -> Result<PriceRecord, ScrapeError> {
    let html = deps.fetcher.get(cotlook::URL, cotlook::HEADERS).await?;
    let raw = cotlook::AIndexRow.extract(&html)?;

    let rate = deps.rates.usd_to_aud().await?;
    let price = convert::usc_per_lb_to_aud_per_bale(raw.price, rate)?;

    let ts = raw.observed_at.unwrap_or_else(|| deps.clock.now());
    Ok(PriceRecord::new(
        "Cotton (Cotlook A Index)",
        price,
        raw.change_pct,
        "$/bale",
        cotlook::URL,
        ts,
    )?)
}

/// Cotton futures forward curve: one Barchart endpoint per contract month
/// code, each scraped independently. Individual contract failures are logged
/// and skipped; only total failure across the curve surfaces as an error.
async fn scrape_futures_curve(deps: &ScrapeDeps) -> Result<Vec<PriceRecord>, ScrapeError> {
    // One rate for the whole curve; no rate, no curve.
    let rate = deps.rates.usd_to_aud().await?;
    let strategy = barchart::TableScan::cotton();
    let symbols = barchart::contract_symbols(deps.clock.now().date_naive());

    let mut out = Vec::with_capacity(symbols.len());
    for sym in &symbols {
        match scrape_contract(deps, &strategy, sym, rate).await {
            Ok(rec) => out.push(rec),
            Err(e) => {
                tracing::warn!(error = %e, contract = %sym, "futures contract scrape failed");
                counter!("scrape_contract_errors_total").increment(1);
            }
        }
    }

    if out.is_empty() {
        return Err(ExtractionError::CurveExhausted {
            attempted: symbols.len(),
        }
        .into());
    }
    Ok(out)
}

async fn scrape_contract(
    deps: &ScrapeDeps,
    strategy: &barchart::TableScan,
    symbol: &str,
    rate: f64,
) -> Result<PriceRecord, ScrapeError> {
    let url = barchart::contract_url(symbol);
    let html = deps.fetcher.get(&url, barchart::HEADERS).await?;
    let raw = strategy.extract(&html)?;

    let price = convert::usc_per_lb_to_aud_per_bale(raw.price, rate)?;
    Ok(PriceRecord::new(
        format!("Cotton ({} Futures)", symbol.to_ascii_uppercase()),
        price,
        raw.change_pct,
        "$/bale",
        url,
        // Barchart publishes no usable quote date; stamp the clock.
        deps.clock.now(),
    )?)
}

/// NSW DPI grains: labeled-section extraction, already in AUD $/tonne.
async fn scrape_grain(
    deps: &ScrapeDeps,
    heading: &'static str,
    display_name: &'static str,
) -> Result<PriceRecord, ScrapeError> {
    let html = deps.fetcher.get(nsw_dpi::URL, nsw_dpi::HEADERS).await?;
    let raw = nsw_dpi::LabeledSection { heading }.extract(&html)?;

    Ok(PriceRecord::new(
        display_name,
        raw.price,
        raw.change_pct,
        "$/tonne",
        nsw_dpi::URL,
        deps.clock.now(),
    )?)
}

/// ABARES beef EYCI: sibling-offset extraction, already in AUD c/kg.
async fn scrape_beef(deps: &ScrapeDeps) -> Result<PriceRecord, ScrapeError> {
    let html = deps.fetcher.get(abares::URL, abares::HEADERS).await?;
    let raw = abares::SiblingOffset::eyci().extract(&html)?;

    Ok(PriceRecord::new(
        "Beef (Eastern Young Cattle Indicator)",
        raw.price,
        raw.change_pct,
        "c/kg",
        abares::URL,
        deps.clock.now(),
    )?)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub inserted: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Scrape every configured commodity once, storing what succeeds. Failures
/// (including unknown ids in the config) are logged and counted, never fatal.
pub async fn run_once(ids: &[String], deps: &ScrapeDeps, store: &PriceStore) -> RunSummary {
    let mut summary = RunSummary::default();

    for id in ids {
        match dispatch(id, deps).await {
            Ok(records) => {
                for rec in records {
                    match store.insert_if_absent(rec) {
                        InsertOutcome::Inserted => summary.inserted += 1,
                        InsertOutcome::SkippedDuplicate => {
                            counter!("scrape_skipped_total").increment(1);
                            summary.skipped += 1;
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, commodity = %id, "commodity scrape failed");
                counter!("scrape_errors_total").increment(1);
                summary.errors += 1;
            }
        }
    }

    gauge!("scrape_last_run_ts").set(deps.clock.now().timestamp().max(0) as f64);
    summary
}
