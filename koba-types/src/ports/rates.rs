//! Exchange rate feed port.
//!
//! This trait defines the interface for live rate sources.
//! Implementations can be HTTP clients, fixed test feeds, etc.

use std::collections::HashMap;

use rust_decimal::Decimal;

/// Error type for rate feed operations.
#[derive(Debug, thiserror::Error)]
pub enum RateFeedError {
    #[error("Rate feed unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid rate feed response: {0}")]
    InvalidResponse(String),
}

/// Port trait for exchange rate providers.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the latest USD-based rates, keyed by currency code.
    ///
    /// Returns how many units of each currency 1 USD buys.
    async fn fetch_rates(&self) -> Result<HashMap<String, Decimal>, RateFeedError>;
}
