// src/scrape/sources/abares.rs
//! Sibling-offset extractor for the ABARES weekly commodity price table.
//!
//! The table has no usable headers, so the row is found by exact text match
//! on its label cell and the values are read from fixed positional offsets to
//! the right: 3rd following cell = this week's price, 4th = previous week.
//! A column reorder upstream shifts meaning without any structural signal;
//! both cells must parse as numbers before the change is computed, so a
//! shifted text column fails fast instead of producing a wrong value.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::scrape::convert::pct_change;
use crate::scrape::error::ExtractionError;
use crate::scrape::fetch::Headers;
use crate::scrape::sources::{parse_f64, text_of, Extract};
use crate::scrape::types::RawMarketData;

pub const URL: &str = "https://www.agriculture.gov.au/abares/data/weekly-commodity-price-update";

pub const HEADERS: Headers = &[
    ("User-Agent", "Mozilla/5.0 (compatible; BeefScraper/1.0)"),
    ("Accept", "text/html,application/xhtml+xml"),
];

/// Label as published, en dash included.
pub const EYCI_LABEL: &str = "Beef \u{2013} Eastern Young Cattle Indicator";

static SEL_TD: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());

/// Reads price and comparison value from fixed sibling-cell positions.
pub struct SiblingOffset {
    pub label: &'static str,
    /// 1-based count of cells to the right holding the current price.
    pub price_cell: usize,
    /// 1-based count of cells to the right holding the previous value.
    pub previous_cell: usize,
}

impl SiblingOffset {
    pub fn eyci() -> Self {
        Self {
            label: EYCI_LABEL,
            price_cell: 3,
            previous_cell: 4,
        }
    }
}

impl Extract for SiblingOffset {
    fn extract(&self, html: &str) -> Result<RawMarketData, ExtractionError> {
        let doc = Html::parse_document(html);

        let label_cell = doc
            .select(&SEL_TD)
            .find(|td| {
                td.value()
                    .attr("style")
                    .is_some_and(|s| s.trim() == "text-align:right;")
                    && text_of(*td) == self.label
            })
            .ok_or_else(|| ExtractionError::AnchorNotFound(format!("{:?} row", self.label)))?;

        let siblings: Vec<ElementRef> = label_cell
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "td")
            .collect();

        if siblings.len() < self.previous_cell {
            return Err(ExtractionError::InsufficientCells {
                row: format!("{:?} row", self.label),
                expected: self.previous_cell,
                found: siblings.len(),
            });
        }

        let price = parse_f64(&text_of(siblings[self.price_cell - 1]))?;
        let previous = parse_f64(&text_of(siblings[self.previous_cell - 1]))?;

        let delta = price - previous;

        Ok(RawMarketData {
            price,
            change_pct: Some(pct_change(delta, previous)),
            observed_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eyci_row(cells: &[&str]) -> String {
        let tds: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
        format!(
            r#"<table><tr>
                 <td style="text-align:right;">{EYCI_LABEL}</td>{tds}
               </tr></table>"#
        )
    }

    #[test]
    fn reads_price_and_previous_from_fixed_offsets() {
        let html = eyci_row(&["19/08/2025", "c/kg", "700", "650"]);
        let raw = SiblingOffset::eyci().extract(&html).unwrap();
        assert_eq!(raw.price, 700.0);
        // change = 50 against previous 650 -> 7.69%
        assert_eq!(raw.change_pct, Some(7.69));
    }

    #[test]
    fn non_numeric_price_cell_fails_fast() {
        let html = eyci_row(&["19/08/2025", "c/kg", "n.a.", "650"]);
        let err = SiblingOffset::eyci().extract(&html).unwrap_err();
        assert!(matches!(err, ExtractionError::NotNumeric(_)));
    }

    #[test]
    fn short_row_is_insufficient_cells() {
        let html = eyci_row(&["19/08/2025", "c/kg", "700"]);
        let err = SiblingOffset::eyci().extract(&html).unwrap_err();
        assert!(matches!(err, ExtractionError::InsufficientCells { .. }));
    }
}
