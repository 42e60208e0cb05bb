// src/scrape/fetch.rs
//! Page fetch collaborator. Extractors never manage connections themselves;
//! they get a body string from here (or a fixture in tests).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::scrape::error::FetchError;

/// Request headers for one source, as (name, value) pairs.
pub type Headers = &'static [(&'static str, &'static str)];

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get(&self, url: &str, headers: Headers) -> Result<String, FetchError>;
}

/// reqwest-backed fetcher with a hard per-request timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub const TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Self::TIMEOUT)
            .build()
            .map_err(|e| FetchError {
                url: String::new(),
                reason: format!("client build: {e}"),
            })?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str, headers: Headers) -> Result<String, FetchError> {
        let mut req = self.client.get(url);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let resp = req.send().await.map_err(|e| FetchError {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let resp = resp.error_for_status().map_err(|e| FetchError {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        resp.text().await.map_err(|e| FetchError {
            url: url.to_string(),
            reason: format!("reading body: {e}"),
        })
    }
}

// --- Test helper ---

/// Serves canned bodies by URL; unknown URLs fail like a dead endpoint.
pub struct FixtureFetcher {
    pages: HashMap<String, String>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
        }
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }
}

impl Default for FixtureFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn get(&self, url: &str, _headers: Headers) -> Result<String, FetchError> {
        self.pages.get(url).cloned().ok_or_else(|| FetchError {
            url: url.to_string(),
            reason: "no fixture for url".to_string(),
        })
    }
}
