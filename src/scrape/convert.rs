// src/scrape/convert.rs
//! Unit/currency conversion. Cotton sources quote US cents per pound; the
//! records we store are AUD dollars per bale.

use crate::scrape::error::ConversionError;

/// Pounds per bale of cotton, the fixed conversion constant.
pub const BALE_WEIGHT_LB: f64 = 500.0;

/// Round to 2 decimal places, half away from zero.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Convert US cents/lb into AUD $/bale at the given USD→AUD rate.
///
/// `normalized = round2((raw * rate / 100) * BALE_WEIGHT_LB)`. The rate must
/// be a positive finite number; extraction never proceeds on a stale or
/// defaulted rate.
pub fn usc_per_lb_to_aud_per_bale(raw_usc_per_lb: f64, rate: f64) -> Result<f64, ConversionError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(ConversionError::RateNotPositive(rate));
    }
    Ok(round2((raw_usc_per_lb * rate / 100.0) * BALE_WEIGHT_LB))
}

/// Percentage change of `delta` against `previous`, rounded to 2 decimals.
/// Zero previous guards to 0.0 instead of dividing.
pub fn pct_change(delta: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    round2(delta / previous * 100.0)
}
