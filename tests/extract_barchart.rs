// tests/extract_barchart.rs
// Heuristic table-scan extraction against Barchart-shaped fixtures.

use agprice_tracker::scrape::error::ExtractionError;
use agprice_tracker::scrape::sources::barchart::TableScan;
use agprice_tracker::scrape::sources::Extract;

const TABLE_HTML: &str = include_str!("fixtures/barchart_ct.html");
const INLINE_HTML: &str = include_str!("fixtures/barchart_inline.html");

#[test]
fn table_row_yields_price_and_published_percent() {
    let raw = TableScan::cotton().extract(TABLE_HTML).unwrap();
    assert_eq!(raw.price, 68.33);
    // The published percent column wins over the raw change.
    assert_eq!(raw.change_pct, Some(0.66));
    assert_eq!(raw.observed_at, None);
}

#[test]
fn inline_fallback_finds_price_when_no_table_matches() {
    let raw = TableScan::cotton().extract(INLINE_HTML).unwrap();
    assert_eq!(raw.price, 68.33);
    assert_eq!(raw.change_pct, Some(0.66));
}

#[test]
fn missing_percent_column_derives_percent_from_delta() {
    let html = r#"<table class="futures">
        <tr><td>CTZ25</td><td>80.00</td><td>+2.00</td><td>n/a</td></tr>
    </table>"#;
    let raw = TableScan::cotton().extract(html).unwrap();
    assert_eq!(raw.price, 80.0);
    // previous = 80 - 2 = 78; 2/78 -> 2.56%
    assert_eq!(raw.change_pct, Some(2.56));
}

#[test]
fn no_change_signal_defaults_to_zero_percent() {
    let html = r#"<table class="quotes">
        <tr><td>CTZ25</td><td>80.00</td><td>unch</td><td>unch</td></tr>
    </table>"#;
    let raw = TableScan::cotton().extract(html).unwrap();
    assert_eq!(raw.change_pct, Some(0.0));
}

#[test]
fn implausible_lone_number_is_rejected_with_the_range() {
    // 250 is outside the 40..200 USc/lb window; it must be rejected even
    // though it is the only number on the page, and the error names it.
    let html = r#"<table class="futures">
        <tr><td>CTZ25</td><td>250.00</td><td>250.00</td><td>250.00</td></tr>
    </table>"#;
    let err = TableScan::cotton().extract(html).unwrap_err();
    assert!(matches!(
        err,
        ExtractionError::ImplausibleRange {
            value,
            min,
            max
        } if value == 250.0 && min == 40.0 && max == 200.0
    ));
}

#[test]
fn empty_page_is_no_extractable_price() {
    let err = TableScan::cotton()
        .extract("<html><body><p>maintenance</p></body></html>")
        .unwrap_err();
    assert!(matches!(err, ExtractionError::NoPrice(_)));
}
