//! Periodic exchange rate refresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, instrument};

use koba_rates::RateError;
use koba_types::{RateFeedError, RateProvider, SharedRates};

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error(transparent)]
    Feed(#[from] RateFeedError),

    #[error("Rejected rate update: {0}")]
    Table(#[from] RateError),
}

/// Pulls rates from a provider and publishes them as new snapshots.
pub struct RateRefresher {
    rates: SharedRates,
    provider: Arc<dyn RateProvider>,
    interval: Duration,
}

impl RateRefresher {
    pub fn new(rates: SharedRates, provider: Arc<dyn RateProvider>, interval: Duration) -> Self {
        Self {
            rates,
            provider,
            interval,
        }
    }

    /// Fetches once and returns the revision now in use.
    ///
    /// Nothing is published when every rate is unchanged, so cached quotes
    /// stay valid. A rejected update leaves the current snapshot in place.
    pub async fn refresh_once(&self) -> Result<u64, RefreshError> {
        let fetched = self.provider.fetch_rates().await?;
        let current = self.rates.snapshot();
        let updated = current.with_rates(fetched)?;

        let unchanged = current
            .iter()
            .zip(updated.iter())
            .all(|(old, new)| old.rate == new.rate);
        if unchanged {
            return Ok(current.revision());
        }

        let revision = self.rates.replace(updated);
        info!(revision, "published refreshed exchange rates");
        Ok(revision)
    }

    #[instrument(skip(self))]
    pub async fn run(self) {
        info!("Starting rate refresher every {:?}", self.interval);
        loop {
            if let Err(e) = self.refresh_once().await {
                error!("Rate refresh failed, keeping current table: {}", e);
            }
            sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    struct FixedFeed(Result<HashMap<String, Decimal>, String>);

    #[async_trait]
    impl RateProvider for FixedFeed {
        async fn fetch_rates(&self) -> Result<HashMap<String, Decimal>, RateFeedError> {
            self.0.clone().map_err(RateFeedError::Unavailable)
        }
    }

    fn refresher(rates: &SharedRates, feed: FixedFeed) -> RateRefresher {
        RateRefresher::new(rates.clone(), Arc::new(feed), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_changed_rates_publish_new_revision() {
        let rates = SharedRates::default();
        let feed = FixedFeed(Ok(HashMap::from([
            ("KES".to_string(), dec!(129.1)),
            ("EUR".to_string(), dec!(0.92)),
        ])));

        let revision = refresher(&rates, feed).refresh_once().await.unwrap();

        assert_eq!(revision, 1);
        let table = rates.snapshot();
        assert_eq!(table.rate_for("KES").unwrap(), dec!(129.1));
        assert!(!table.contains("EUR"));
    }

    #[tokio::test]
    async fn test_unchanged_rates_keep_revision() {
        let rates = SharedRates::default();
        let feed = FixedFeed(Ok(HashMap::from([("UGX".to_string(), dec!(3582.34))])));

        let revision = refresher(&rates, feed).refresh_once().await.unwrap();

        assert_eq!(revision, 0);
    }

    #[tokio::test]
    async fn test_feed_failure_keeps_table() {
        let rates = SharedRates::default();
        let feed = FixedFeed(Err("timeout".into()));

        let result = refresher(&rates, feed).refresh_once().await;

        assert!(matches!(result, Err(RefreshError::Feed(_))));
        assert_eq!(rates.revision(), 0);
    }

    #[tokio::test]
    async fn test_invalid_rate_is_rejected() {
        let rates = SharedRates::default();
        let feed = FixedFeed(Ok(HashMap::from([("BIF".to_string(), dec!(0))])));

        let result = refresher(&rates, feed).refresh_once().await;

        assert!(matches!(result, Err(RefreshError::Table(_))));
        assert_eq!(rates.snapshot().rate_for("BIF").unwrap(), dec!(2850));
    }
}
