// src/scrape/sources/nsw_dpi.rs
//! Labeled-section extractor for the NSW DPI commodity report page.
//!
//! Each grain gets a named section: an `h2` heading ("Wheat", "Barley"),
//! wrapped in a bootstrap `div.row`, with the price inside the `div.col-md-8`
//! column as a dollar-prefixed `h2` and the week's movement in a `strong`
//! tag. The movement text "steady" (any case) means exactly 0.0; a missing
//! or unrecognized movement is `None` (explicitly unknown, not zero).

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::scrape::error::ExtractionError;
use crate::scrape::fetch::Headers;
use crate::scrape::sources::{first_capture, text_of, Extract};
use crate::scrape::types::RawMarketData;

pub const URL: &str = "https://www.dpi.nsw.gov.au/agriculture/commodity-report";

pub const HEADERS: Headers = &[
    ("User-Agent", "Mozilla/5.0 (compatible; CommodityScraper/1.0)"),
    ("Accept", "text/html,application/xhtml+xml"),
];

static SEL_H2: Lazy<Selector> = Lazy::new(|| Selector::parse("h2").unwrap());
static SEL_COLUMN: Lazy<Selector> = Lazy::new(|| Selector::parse("div.col-md-8").unwrap());
static SEL_STRONG: Lazy<Selector> = Lazy::new(|| Selector::parse("strong").unwrap());

static RE_DOLLAR_PRICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(\d+(?:\.\d+)?)").unwrap());
static RE_SIGNED_PCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([+-]?\d+(?:\.\d+)?)%").unwrap());

/// Extracts the section under the given heading text.
pub struct LabeledSection {
    pub heading: &'static str,
}

impl Extract for LabeledSection {
    fn extract(&self, html: &str) -> Result<RawMarketData, ExtractionError> {
        let doc = Html::parse_document(html);

        let heading = doc
            .select(&SEL_H2)
            .find(|h| text_of(*h) == self.heading)
            .ok_or_else(|| ExtractionError::AnchorNotFound(format!("{} section", self.heading)))?;

        let row = heading
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| {
                el.value().name() == "div"
                    && el
                        .value()
                        .attr("class")
                        .is_some_and(|c| c.split_whitespace().any(|t| t == "row"))
            })
            .ok_or_else(|| {
                ExtractionError::AnchorNotFound(format!("container for {} price", self.heading))
            })?;

        let container = row.select(&SEL_COLUMN).next().ok_or_else(|| {
            ExtractionError::AnchorNotFound(format!("price column for {}", self.heading))
        })?;

        let price_el = container.select(&SEL_H2).next().ok_or_else(|| {
            ExtractionError::NoPrice(format!("{} section has no price header", self.heading))
        })?;
        let price = first_capture(&RE_DOLLAR_PRICE, &text_of(price_el)).ok_or_else(|| {
            ExtractionError::NoPrice(format!("{} section", self.heading))
        })?;

        let change_pct = match container.select(&SEL_STRONG).next() {
            Some(tag) => {
                let t = text_of(tag);
                if t.to_lowercase().contains("steady") {
                    Some(0.0)
                } else {
                    first_capture(&RE_SIGNED_PCT, &t)
                }
            }
            None => None,
        };

        Ok(RawMarketData {
            price,
            change_pct,
            observed_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(heading: &str, price: &str, movement: &str) -> String {
        format!(
            r#"<html><body><div class="row">
                 <div class="col-md-4"><h2>{heading}</h2></div>
                 <div class="col-md-8"><h2>{price}</h2><p><strong>{movement}</strong></p></div>
               </div></body></html>"#
        )
    }

    #[test]
    fn steady_maps_to_zero_in_any_case() {
        for word in ["steady", "Steady", "STEADY", "holding steady"] {
            let html = section("Wheat", "$345/tonne", word);
            let raw = LabeledSection { heading: "Wheat" }.extract(&html).unwrap();
            assert_eq!(raw.price, 345.0);
            assert_eq!(raw.change_pct, Some(0.0));
        }
    }

    #[test]
    fn unrecognized_movement_is_none_not_zero() {
        let html = section("Barley", "$310.50", "firming");
        let raw = LabeledSection { heading: "Barley" }.extract(&html).unwrap();
        assert_eq!(raw.price, 310.5);
        assert_eq!(raw.change_pct, None);
    }

    #[test]
    fn signed_percent_is_parsed() {
        let html = section("Wheat", "$345", "-2.4%");
        let raw = LabeledSection { heading: "Wheat" }.extract(&html).unwrap();
        assert_eq!(raw.change_pct, Some(-2.4));
    }

    #[test]
    fn missing_section_is_anchor_not_found() {
        let html = section("Wheat", "$345", "steady");
        let err = LabeledSection { heading: "Barley" }.extract(&html).unwrap_err();
        assert!(matches!(err, ExtractionError::AnchorNotFound(_)));
    }
}
