// src/scrape/rates.rs
//! Exchange-rate collaborator. Cotton conversions need a live USD→AUD rate;
//! an unavailable rate is a hard `ConversionError`, never a silent default.

use async_trait::async_trait;

use crate::scrape::error::ConversionError;

pub const EXCHANGE_RATE_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn usd_to_aud(&self) -> Result<f64, ConversionError>;
}

/// Live rate from exchangerate-api.com (`rates.AUD` of the USD table).
pub struct ExchangeRateApi {
    client: reqwest::Client,
    url: String,
}

impl ExchangeRateApi {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            url: EXCHANGE_RATE_URL.to_string(),
        }
    }

    pub fn with_url(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl RateSource for ExchangeRateApi {
    async fn usd_to_aud(&self) -> Result<f64, ConversionError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ConversionError::RateUnavailable(format!("GET {}: {e}", self.url)))?;
        let resp = resp
            .error_for_status()
            .map_err(|e| ConversionError::RateUnavailable(format!("status: {e}")))?;
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ConversionError::RateUnavailable(format!("body: {e}")))?;

        let rate = body["rates"]["AUD"]
            .as_f64()
            .ok_or_else(|| ConversionError::RateUnavailable("rates.AUD missing".to_string()))?;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ConversionError::RateNotPositive(rate));
        }
        Ok(rate)
    }
}

// --- Test helpers ---

/// Fixed rate for tests and offline runs.
pub struct FixedRate(pub f64);

#[async_trait]
impl RateSource for FixedRate {
    async fn usd_to_aud(&self) -> Result<f64, ConversionError> {
        Ok(self.0)
    }
}

/// Always-unavailable rate, to exercise the failure path.
pub struct UnavailableRate;

#[async_trait]
impl RateSource for UnavailableRate {
    async fn usd_to_aud(&self) -> Result<f64, ConversionError> {
        Err(ConversionError::RateUnavailable(
            "rate source offline".to_string(),
        ))
    }
}
