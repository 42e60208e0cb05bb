// src/scrape/types.rs
use chrono::{DateTime, Utc};

use crate::scrape::error::ExtractionError;

/// One normalized price observation. Immutable once built; unit and currency
/// come from the commodity table, never from scraped markup.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct PriceRecord {
    /// Display name incl. source variant, e.g. "Cotton (Cotlook A Index)".
    pub commodity: String,
    pub price: f64,
    pub currency: String,
    /// Percent change vs. the previous observation. `None` when the source
    /// publishes no change signal; `0.0` on "steady" or a zero-division guard.
    pub change: Option<f64>,
    pub unit: String,
    /// Provenance URL, not a live link.
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

impl PriceRecord {
    /// Assemble a record, enforcing the price invariant. Pure; no I/O.
    pub fn new(
        commodity: impl Into<String>,
        price: f64,
        change: Option<f64>,
        unit: impl Into<String>,
        source: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ExtractionError> {
        if !price.is_finite() || price < 0.0 {
            return Err(ExtractionError::InvalidPrice(price));
        }
        Ok(Self {
            commodity: commodity.into(),
            price,
            currency: "AUD".to_string(),
            change,
            unit: unit.into(),
            source: source.into(),
            timestamp,
        })
    }
}

/// Raw output of one extraction strategy, still in source-native units.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMarketData {
    pub price: f64,
    pub change_pct: Option<f64>,
    /// Authoritative publication time, when the source states one. Sources
    /// without a reliable date leave this `None` and the pipeline stamps the
    /// injected clock instead.
    pub observed_at: Option<DateTime<Utc>>,
}

/// Injected wall-clock so tests can supply a fixed instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed-instant clock for tests.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
