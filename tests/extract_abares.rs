// tests/extract_abares.rs
// Sibling-offset extraction for the ABARES beef row, through the dispatcher.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use agprice_tracker::scrape::error::{ExtractionError, ScrapeError};
use agprice_tracker::scrape::fetch::FixtureFetcher;
use agprice_tracker::scrape::rates::FixedRate;
use agprice_tracker::scrape::sources::abares;
use agprice_tracker::scrape::types::FixedClock;
use agprice_tracker::scrape::{dispatch, ScrapeDeps};

const ABARES_HTML: &str = include_str!("fixtures/abares_weekly.html");

fn deps_with(html: &str) -> ScrapeDeps {
    ScrapeDeps {
        fetcher: Arc::new(FixtureFetcher::new().with_page(abares::URL, html)),
        rates: Arc::new(FixedRate(1.5)),
        clock: Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2025, 8, 23, 6, 0, 0).unwrap(),
        )),
    }
}

#[tokio::test]
async fn eyci_row_yields_price_and_week_on_week_percent() {
    let records = dispatch("beef", &deps_with(ABARES_HTML)).await.unwrap();
    assert_eq!(records.len(), 1);
    let rec = &records[0];

    assert_eq!(rec.commodity, "Beef (Eastern Young Cattle Indicator)");
    assert_eq!(rec.price, 700.0);
    assert_eq!(rec.unit, "c/kg");
    // 700 vs previous 650 -> +50 -> 7.69%
    assert_eq!(rec.change, Some(7.69));
    assert_eq!(
        rec.timestamp,
        Utc.with_ymd_and_hms(2025, 8, 23, 6, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn missing_label_row_is_anchor_not_found() {
    let html = r#"<table><tr><td style="text-align:right;">Wool – EMI</td>
                  <td>19/08/2025</td><td>c/kg</td><td>1100</td><td>1090</td></tr></table>"#;
    let err = dispatch("beef", &deps_with(html)).await.unwrap_err();
    assert!(matches!(
        err,
        ScrapeError::Extraction(ExtractionError::AnchorNotFound(_))
    ));
}

#[tokio::test]
async fn text_in_a_value_column_fails_fast_instead_of_mis_computing() {
    // A column reorder that pushes text into the price offset must surface
    // as an error, not as a wrong change value.
    let html = r#"<table><tr>
        <td style="text-align:right;">Beef – Eastern Young Cattle Indicator</td>
        <td>c/kg</td><td>19/08/2025</td><td>see note</td><td>650</td>
    </tr></table>"#;
    let err = dispatch("beef", &deps_with(html)).await.unwrap_err();
    assert!(matches!(
        err,
        ScrapeError::Extraction(ExtractionError::NotNumeric(_))
    ));
}
