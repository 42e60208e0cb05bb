// src/scrape/sources/barchart.rs
//! Heuristic table-scan extractor for Barchart futures pages.
//!
//! No stable anchor exists on these pages, so extraction works down a
//! priority list: find a plausible futures table by class keyword (or by the
//! ticker appearing in its text), find the contract row by its ticker-like
//! symbol, then scan a bounded window of cells for a price inside the
//! commodity's plausible range. Values outside the range are false positives
//! (volumes, timestamps) and are rejected even when nothing else matches.
//! Change and percent tokens are scanned independently and are optional; a
//! missing price is a hard failure.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::scrape::error::ExtractionError;
use crate::scrape::fetch::Headers;
use crate::scrape::sources::{first_capture, text_of, Extract};
use crate::scrape::types::RawMarketData;

pub const BASE_URL: &str = "https://www.barchart.com/futures/quotes";

/// Barchart rejects plain bots; send a full browser header set.
pub const HEADERS: Headers = &[
    (
        "User-Agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    ),
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("Connection", "keep-alive"),
    ("Upgrade-Insecure-Requests", "1"),
    ("Sec-Fetch-Dest", "document"),
    ("Sec-Fetch-Mode", "navigate"),
    ("Sec-Fetch-Site", "none"),
];

/// Plausible cotton futures price window, US cents per pound (exclusive).
pub const COTTON_PLAUSIBLE_USC_LB: (f64, f64) = (40.0, 200.0);

/// Cotton contract month codes: Mar, May, Jul, Oct, Dec.
pub const CONTRACT_MONTHS: [(char, u32); 5] = [('H', 3), ('K', 5), ('N', 7), ('V', 10), ('Z', 12)];

pub fn contract_url(symbol: &str) -> String {
    format!("{BASE_URL}/{symbol}/futures-prices")
}

/// The next five cotton contract symbols from `today`, nearest first,
/// e.g. `["ctv25", "ctz25", "cth26", "ctk26", "ctn26"]`.
pub fn contract_symbols(today: NaiveDate) -> Vec<String> {
    let mut year = today.year();
    let mut idx = match CONTRACT_MONTHS.iter().position(|&(_, m)| m >= today.month()) {
        Some(i) => i,
        None => {
            year += 1;
            0
        }
    };

    let mut out = Vec::with_capacity(CONTRACT_MONTHS.len());
    for _ in 0..CONTRACT_MONTHS.len() {
        let (code, _) = CONTRACT_MONTHS[idx];
        out.push(format!(
            "ct{}{:02}",
            code.to_ascii_lowercase(),
            year.rem_euclid(100)
        ));
        idx += 1;
        if idx == CONTRACT_MONTHS.len() {
            idx = 0;
            year += 1;
        }
    }
    out
}

static SEL_TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static SEL_TR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static SEL_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td, th").unwrap());
static SEL_INLINE: Lazy<Selector> = Lazy::new(|| Selector::parse("span, div, td").unwrap());

static RE_TABLE_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)table|futures|quotes").unwrap());
static RE_PRICE_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)price|last|quote|value").unwrap());
static RE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+\.?[0-9]+)").unwrap());
static RE_INLINE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]{2,3}\.?[0-9]*)").unwrap());
static RE_SIGNED: Lazy<Regex> = Lazy::new(|| Regex::new(r"([+-]?[0-9]+\.?[0-9]*)").unwrap());
static RE_SIGNED_PCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([+-]?[0-9]+\.?[0-9]*)%").unwrap());
static RE_SIGNED_STRICT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([+-][0-9]+\.?[0-9]*)").unwrap());
static RE_SIGNED_PCT_STRICT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([+-][0-9]+\.?[0-9]*)%").unwrap());

/// What one scan pass found. `rejected` remembers a numeric candidate that
/// fell outside the plausible range, so total failure can name it.
#[derive(Default)]
struct Scan {
    price: Option<f64>,
    delta: Option<f64>,
    pct: Option<f64>,
    rejected: Option<f64>,
}

/// Heuristic scan of an un-labeled futures quote page.
pub struct TableScan {
    ticker: &'static str,
    commodity_word: &'static str,
    plausible: (f64, f64),
    symbol_re: Regex,
}

impl TableScan {
    pub fn new(ticker: &'static str, commodity_word: &'static str, plausible: (f64, f64)) -> Self {
        let symbol_re =
            Regex::new(&format!(r"^{ticker}[A-Z]?\d{{2}}")).expect("ticker symbol pattern");
        Self {
            ticker,
            commodity_word,
            plausible,
            symbol_re,
        }
    }

    pub fn cotton() -> Self {
        Self::new("CT", "cotton", COTTON_PLAUSIBLE_USC_LB)
    }

    fn in_range(&self, v: f64) -> bool {
        self.plausible.0 < v && v < self.plausible.1
    }

    /// Table whose class matches a known keyword, else any table that
    /// mentions the ticker or commodity name.
    fn candidate_table<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        let tables: Vec<ElementRef<'a>> = doc.select(&SEL_TABLE).collect();
        if let Some(t) = tables.iter().find(|t| {
            t.value()
                .attr("class")
                .is_some_and(|c| RE_TABLE_CLASS.is_match(c))
        }) {
            return Some(*t);
        }
        tables.into_iter().find(|t| {
            let text = t.text().collect::<String>();
            text.contains(self.ticker) || text.to_lowercase().contains(self.commodity_word)
        })
    }

    /// Scan table rows for the contract row, then a bounded window of cells:
    /// price in cells 1..4, change in 2..5, percent in 3..6.
    fn scan_table(&self, table: ElementRef<'_>) -> Scan {
        let mut scan = Scan::default();
        for row in table.select(&SEL_TR) {
            let cells: Vec<ElementRef> = row.select(&SEL_CELL).collect();
            if cells.len() < 4 {
                continue;
            }
            let first = text_of(cells[0]);
            if !(self.symbol_re.is_match(&first) || first.contains(self.ticker)) {
                continue;
            }

            let mut price = None;
            for cell in &cells[1..cells.len().min(4)] {
                if let Some(v) = first_capture(&RE_NUMBER, &text_of(*cell)) {
                    if self.in_range(v) {
                        price = Some(v);
                        break;
                    }
                    scan.rejected.get_or_insert(v);
                }
            }
            let Some(price) = price else { continue };

            let mut delta = None;
            for cell in &cells[2..cells.len().min(5)] {
                if let Some(v) = first_capture(&RE_SIGNED, &text_of(*cell)) {
                    delta = Some(v);
                    break;
                }
            }

            let mut pct = None;
            for cell in &cells[3..cells.len().min(6)] {
                if let Some(v) = first_capture(&RE_SIGNED_PCT, &text_of(*cell)) {
                    pct = Some(v);
                    break;
                }
            }

            scan.price = Some(price);
            scan.delta = delta;
            scan.pct = pct;
            return scan;
        }
        scan
    }

    /// Fallback: styled inline elements selected by class keyword, with
    /// change/percent scanned from elements under the same parent.
    fn scan_inline(&self, doc: &Html) -> Scan {
        let mut scan = Scan::default();
        for el in doc.select(&SEL_INLINE) {
            let Some(class) = el.value().attr("class") else {
                continue;
            };
            if !RE_PRICE_CLASS.is_match(class) {
                continue;
            }
            let Some(v) = first_capture(&RE_INLINE_NUMBER, &text_of(el)) else {
                continue;
            };
            if !self.in_range(v) {
                scan.rejected.get_or_insert(v);
                continue;
            }

            let mut delta = None;
            let mut pct = None;
            if let Some(parent) = el.parent().and_then(ElementRef::wrap) {
                for sib in parent.select(&SEL_INLINE) {
                    let s = text_of(sib);
                    if delta.is_none() {
                        delta = first_capture(&RE_SIGNED_STRICT, &s);
                    }
                    if pct.is_none() {
                        pct = first_capture(&RE_SIGNED_PCT_STRICT, &s);
                    }
                }
            }
            scan.price = Some(v);
            scan.delta = delta;
            scan.pct = pct;
            return scan;
        }
        scan
    }
}

impl Extract for TableScan {
    fn extract(&self, html: &str) -> Result<RawMarketData, ExtractionError> {
        let doc = Html::parse_document(html);

        let table_scan = match self.candidate_table(&doc) {
            Some(table) => self.scan_table(table),
            None => Scan::default(),
        };
        let scan = if table_scan.price.is_some() {
            table_scan
        } else {
            let mut inline = self.scan_inline(&doc);
            inline.rejected = inline.rejected.or(table_scan.rejected);
            inline
        };

        let Some(price) = scan.price else {
            // Distinguish "saw a number but it was implausible" from
            // "found nothing that looks like a price at all".
            return Err(match scan.rejected {
                Some(value) => ExtractionError::ImplausibleRange {
                    value,
                    min: self.plausible.0,
                    max: self.plausible.1,
                },
                None => ExtractionError::NoPrice(format!("{} futures page", self.ticker)),
            });
        };

        // Prefer the published percent; else derive it from the raw move
        // (previous = price - delta); else report an unchanged market.
        let change_pct = match (scan.pct, scan.delta) {
            (Some(p), _) => p,
            (None, Some(d)) => crate::scrape::convert::pct_change(d, price - d),
            (None, None) => 0.0,
        };

        Ok(RawMarketData {
            price,
            change_pct: Some(change_pct),
            observed_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_symbols_roll_over_year_end() {
        let today = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
        assert_eq!(
            contract_symbols(today),
            vec!["ctz25", "cth26", "ctk26", "ctn26", "ctv26"]
        );
    }

    #[test]
    fn contract_symbols_start_mid_year() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 23).unwrap();
        assert_eq!(
            contract_symbols(today),
            vec!["ctv25", "ctz25", "cth26", "ctk26", "ctn26"]
        );
    }

    #[test]
    fn symbol_pattern_matches_month_coded_contracts() {
        let s = TableScan::cotton();
        assert!(s.symbol_re.is_match("CTZ25"));
        assert!(s.symbol_re.is_match("CTH26 Cotton"));
        assert!(!s.symbol_re.is_match("WZ25"));
    }

    #[test]
    fn out_of_range_number_is_rejected_even_if_alone() {
        let html = r#"<table class="futures-table"><tr>
            <td>CTZ25</td><td>250.00</td><td>+1.00</td><td>+0.40%</td>
        </tr></table>"#;
        let err = TableScan::cotton().extract(html).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::ImplausibleRange { value, .. } if value == 250.0
        ));
    }
}
