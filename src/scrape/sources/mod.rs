// src/scrape/sources/mod.rs
// One extraction strategy per commodity source. Each strategy is a named,
// independently testable unit behind the same capability interface; the
// dispatcher's static table picks which one runs.

pub mod abares;
pub mod barchart;
pub mod cotlook;
pub mod nsw_dpi;

use regex::Regex;
use scraper::ElementRef;

use crate::scrape::error::ExtractionError;
use crate::scrape::types::RawMarketData;

/// Take one source's markup, return raw market data in source-native units.
pub trait Extract: Send + Sync {
    fn extract(&self, html: &str) -> Result<RawMarketData, ExtractionError>;
}

/// Concatenated, trimmed text content of an element.
pub(crate) fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

pub(crate) fn parse_f64(s: &str) -> Result<f64, ExtractionError> {
    let t = s.trim();
    t.parse::<f64>()
        .map_err(|_| ExtractionError::NotNumeric(t.to_string()))
}

/// First capture group of `re` in `s`, parsed as f64.
pub(crate) fn first_capture(re: &Regex, s: &str) -> Option<f64> {
    re.captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
