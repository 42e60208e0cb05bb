// src/scrape/sources/cotlook.rs
//! Fixed-row extractor for the Cotlook A Index front page.
//!
//! The page carries a uniquely identified row (`tr#aIndex`) with exactly two
//! cells of interest: the index value in US cents per pound, and the day's
//! move wrapped in parentheses, e.g. `(+1.5)`. The published index date sits
//! in a text node right after a screen-reader marker span; Cotlook is the one
//! source with an authoritative date, so we parse it rather than stamping the
//! clock.

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::scrape::convert::pct_change;
use crate::scrape::error::ExtractionError;
use crate::scrape::fetch::Headers;
use crate::scrape::sources::{parse_f64, text_of, Extract};
use crate::scrape::types::RawMarketData;

pub const URL: &str = "https://www.cotlook.com";

pub const HEADERS: Headers = &[
    ("User-Agent", "Mozilla/5.0 (compatible; CottonScraper/1.0)"),
    ("Accept", "text/html,application/xhtml+xml"),
];

const DATE_MARKER: &str = "Date of index value";

static SEL_ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr#aIndex").unwrap());
static SEL_TD: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static SEL_SR_SPAN: Lazy<Selector> = Lazy::new(|| Selector::parse("span.show-for-sr").unwrap());

pub struct AIndexRow;

impl Extract for AIndexRow {
    fn extract(&self, html: &str) -> Result<RawMarketData, ExtractionError> {
        let doc = Html::parse_document(html);

        let row = doc
            .select(&SEL_ROW)
            .next()
            .ok_or_else(|| ExtractionError::AnchorNotFound("A Index row".to_string()))?;

        let cells: Vec<ElementRef> = row.select(&SEL_TD).collect();
        if cells.len() < 2 {
            return Err(ExtractionError::InsufficientCells {
                row: "A Index row".to_string(),
                expected: 2,
                found: cells.len(),
            });
        }

        let price = parse_f64(&text_of(cells[0]))?;
        let delta = parse_f64(&text_of(cells[1]).replace(['(', ')'], ""))?;

        // The delta is the move from the previous index value to this one,
        // so previous = price + delta.
        let previous = price + delta;
        let change_pct = pct_change(delta, previous);

        let observed_at = index_date(&doc)?;

        Ok(RawMarketData {
            price,
            change_pct: Some(change_pct),
            observed_at: Some(observed_at),
        })
    }
}

/// Locate the published index date: a text node following the screen-reader
/// marker span.
fn index_date(doc: &Html) -> Result<DateTime<Utc>, ExtractionError> {
    let marker = doc
        .select(&SEL_SR_SPAN)
        .find(|el| el.text().collect::<String>().contains(DATE_MARKER))
        .ok_or_else(|| ExtractionError::AnchorNotFound("index date span".to_string()))?;

    let raw = marker
        .next_siblings()
        .filter_map(|n| n.value().as_text().map(|t| t.to_string()))
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .ok_or_else(|| ExtractionError::AnchorNotFound("index date text".to_string()))?;

    parse_index_date(&raw)
}

/// Parse e.g. `14:00 GMT 21st Aug, 2025` (ordinal suffix stripped first).
pub fn parse_index_date(raw: &str) -> Result<DateTime<Utc>, ExtractionError> {
    static RE_ORDINAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)(st|nd|rd|th)").unwrap());
    let cleaned = RE_ORDINAL.replace_all(raw.trim(), "${1}");
    NaiveDateTime::parse_from_str(&cleaned, "%H:%M GMT %d %b, %Y")
        .map(|dt| dt.and_utc())
        .map_err(|_| ExtractionError::BadDate(raw.trim().to_string()))
}
