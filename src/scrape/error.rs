// src/scrape/error.rs
// Failure taxonomy for the scrape pipeline. Every variant carries enough
// detail to tell the exact failure point apart in logs.

use thiserror::Error;

/// Transport-level failure from the page fetch collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("fetch failed for {url}: {reason}")]
pub struct FetchError {
    pub url: String,
    pub reason: String,
}

/// Structural failure while pulling a raw (price, change) pair out of markup.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExtractionError {
    /// The stable anchor (row id, heading, label cell) is missing.
    #[error("{0} not found")]
    AnchorNotFound(String),

    #[error("not enough cells in {row}: expected {expected}, found {found}")]
    InsufficientCells {
        row: String,
        expected: usize,
        found: usize,
    },

    #[error("value not numeric: {0:?}")]
    NotNumeric(String),

    /// A lone numeric match outside the commodity's plausible range is a
    /// false positive, never a price.
    #[error("price {value} outside plausible range {min}..{max}")]
    ImplausibleRange { value: f64, min: f64, max: f64 },

    #[error("no extractable price in {0}")]
    NoPrice(String),

    #[error("could not parse index date {0:?}")]
    BadDate(String),

    /// Every endpoint of a multi-contract scan failed.
    #[error("no extractable price from any of {attempted} futures endpoints")]
    CurveExhausted { attempted: usize },

    /// Normalizer invariant: price must be finite and non-negative.
    #[error("price is not a finite non-negative number: {0}")]
    InvalidPrice(f64),
}

/// Failure in the unit/currency conversion step.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConversionError {
    #[error("exchange rate unavailable: {0}")]
    RateUnavailable(String),

    #[error("exchange rate is not a positive finite number: {0}")]
    RateNotPositive(f64),
}

/// Top-level error surfaced by the dispatcher and pipeline.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("unsupported commodity: {0}")]
    UnsupportedCommodity(String),
}
