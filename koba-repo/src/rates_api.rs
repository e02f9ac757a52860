//! HTTP exchange rate feed.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

use koba_types::{RateFeedError, RateProvider};

/// Public USD feed used when no URL is configured.
pub const DEFAULT_RATES_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";

#[derive(Deserialize)]
struct LatestRates {
    #[serde(default)]
    base: Option<String>,
    rates: HashMap<String, Decimal>,
}

/// Rate provider backed by an `exchangerate-api.com` style endpoint.
///
/// Expects `{"base": "USD", "rates": {"KES": 128.5, ...}}`.
pub struct ExchangeRateApi {
    client: reqwest::Client,
    url: String,
}

impl ExchangeRateApi {
    /// Default request timeout for feed calls.
    pub const TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(url: impl Into<String>) -> Result<Self, RateFeedError> {
        Self::with_timeout(url, Self::TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, RateFeedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RateFeedError::Unavailable(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RateProvider for ExchangeRateApi {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_rates(&self) -> Result<HashMap<String, Decimal>, RateFeedError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| RateFeedError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RateFeedError::Unavailable(format!(
                "feed returned {}",
                response.status()
            )));
        }

        let body: LatestRates = response
            .json()
            .await
            .map_err(|e| RateFeedError::InvalidResponse(e.to_string()))?;

        if let Some(base) = body.base.as_deref() {
            if !base.eq_ignore_ascii_case("USD") {
                return Err(RateFeedError::InvalidResponse(format!(
                    "expected USD base, got {}",
                    base
                )));
            }
        }

        debug!(count = body.rates.len(), "fetched exchange rates");
        Ok(body.rates)
    }
}
