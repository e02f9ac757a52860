//! Per-product price cache.
//!
//! Quote sets are kept in memory and, when a store is attached, persisted
//! through the `PriceCacheStore` port. The store is an optimization only:
//! every store failure is logged and the cache falls back to computing the
//! quotes directly.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use koba_types::{CachedPrices, PriceCacheStore, PricingError, ProductId, RepoError, SharedRates};

/// How often a failing store call is retried before giving up.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            backoff: Duration::from_millis(50),
        }
    }
}

/// Memoizes quote sets per product.
///
/// Entries are immutable `Arc<CachedPrices>` values that are only ever
/// replaced whole, so concurrent readers never see a partial set. Two
/// callers missing on the same product may both compute; the last insert
/// wins and both results are identical.
pub struct PriceCache {
    rates: SharedRates,
    entries: DashMap<ProductId, Arc<CachedPrices>>,
    store: Option<Arc<dyn PriceCacheStore>>,
    retry: RetryPolicy,
}

impl PriceCache {
    /// Creates an in-memory cache over the shared rates.
    pub fn new(rates: SharedRates) -> Self {
        Self {
            rates,
            entries: DashMap::new(),
            store: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Attaches a persistent store.
    pub fn with_store(mut self, store: Arc<dyn PriceCacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn rates(&self) -> &SharedRates {
        &self.rates
    }

    /// Number of products with an in-memory entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the quotes for a product, computing them when nothing fresh
    /// is cached for this base price and rate table.
    pub async fn get_or_compute(
        &self,
        product_id: ProductId,
        base_price_usd: Decimal,
    ) -> Result<Arc<CachedPrices>, PricingError> {
        let engine = self.rates.engine();

        let cached = self
            .entries
            .get(&product_id)
            .map(|entry| Arc::clone(entry.value()));
        if let Some(cached) = cached {
            if cached.is_fresh(base_price_usd, engine.rates()) {
                debug!(%product_id, "price cache hit");
                return Ok(cached);
            }
        }

        if let Some(stored) = self.load(product_id).await {
            if stored.is_fresh(base_price_usd, engine.rates()) {
                debug!(%product_id, "price cache hit from store");
                let stored = Arc::new(stored);
                self.entries.insert(product_id, Arc::clone(&stored));
                return Ok(stored);
            }
        }

        debug!(%product_id, revision = engine.revision(), "computing prices");
        let quotes = engine.convert_all(base_price_usd)?;
        let fresh = Arc::new(CachedPrices::new(
            product_id,
            base_price_usd,
            engine.revision(),
            quotes,
        ));
        self.entries.insert(product_id, Arc::clone(&fresh));
        self.save(&fresh).await;

        Ok(fresh)
    }

    /// Drops everything cached for a product.
    pub async fn invalidate(&self, product_id: ProductId) {
        self.entries.remove(&product_id);

        let Some(store) = self.store.clone() else {
            return;
        };
        let result = self
            .retry_store_call("remove", move || {
                let store = Arc::clone(&store);
                async move { store.remove_prices(product_id).await }
            })
            .await;
        if let Err(e) = result {
            warn!(%product_id, error = %e, "failed to remove persisted prices");
        }
    }

    async fn load(&self, product_id: ProductId) -> Option<CachedPrices> {
        let store = self.store.clone()?;
        let result = self
            .retry_store_call("load", move || {
                let store = Arc::clone(&store);
                async move { store.load_prices(product_id).await }
            })
            .await;

        match result {
            Ok(found) => found,
            Err(e) => {
                warn!(%product_id, error = %e, "falling back to direct computation");
                None
            }
        }
    }

    async fn save(&self, prices: &Arc<CachedPrices>) {
        let Some(store) = self.store.clone() else {
            return;
        };
        let product_id = prices.product_id;
        let prices = Arc::clone(prices);
        let result = self
            .retry_store_call("save", move || {
                let store = Arc::clone(&store);
                let prices = Arc::clone(&prices);
                async move { store.save_prices(&prices).await }
            })
            .await;
        if let Err(e) = result {
            warn!(%product_id, error = %e, "failed to persist prices");
        }
    }

    async fn retry_store_call<T, F, Fut>(&self, op: &'static str, mut call: F) -> Result<T, RepoError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RepoError>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.retry.attempts => {
                    attempt += 1;
                    debug!(op, attempt, error = %e, "retrying price store call");
                    tokio::time::sleep(self.retry.backoff * attempt).await;
                }
                Err(e) => return Err(RepoError::CacheBackendUnavailable(e.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use koba_types::RateTable;
    use rust_decimal_macros::dec;

    /// Store that fails its first `failures` calls.
    #[derive(Default)]
    struct FlakyStore {
        failures: AtomicU32,
        calls: AtomicU32,
        records: Mutex<HashMap<ProductId, CachedPrices>>,
    }

    impl FlakyStore {
        fn failing(failures: u32) -> Self {
            Self {
                failures: AtomicU32::new(failures),
                ..Default::default()
            }
        }

        fn check(&self) -> Result<(), RepoError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(RepoError::Database("connection refused".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PriceCacheStore for FlakyStore {
        async fn load_prices(&self, id: ProductId) -> Result<Option<CachedPrices>, RepoError> {
            self.check()?;
            Ok(self.records.lock().unwrap().get(&id).cloned())
        }

        async fn save_prices(&self, prices: &CachedPrices) -> Result<(), RepoError> {
            self.check()?;
            self.records
                .lock()
                .unwrap()
                .insert(prices.product_id, prices.clone());
            Ok(())
        }

        async fn remove_prices(&self, id: ProductId) -> Result<(), RepoError> {
            self.check()?;
            self.records.lock().unwrap().remove(&id);
            Ok(())
        }
    }

    fn no_backoff(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            backoff: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_memory() {
        let cache = PriceCache::new(SharedRates::default());
        let id = ProductId::new();

        let first = cache.get_or_compute(id, dec!(29.99)).await.unwrap();
        let second = cache.get_or_compute(id, dec!(29.99)).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.quotes.len(), 4);
        assert_eq!(first.quotes[0].amount, dec!(3853.72));
    }

    #[tokio::test]
    async fn test_price_change_recomputes() {
        let cache = PriceCache::new(SharedRates::default());
        let id = ProductId::new();

        let first = cache.get_or_compute(id, dec!(10)).await.unwrap();
        let second = cache.get_or_compute(id, dec!(20)).await.unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.quotes[0].amount, dec!(2570));
    }

    #[tokio::test]
    async fn test_rate_refresh_makes_entries_stale() {
        let rates = SharedRates::default();
        let cache = PriceCache::new(rates.clone());
        let id = ProductId::new();

        cache.get_or_compute(id, dec!(1)).await.unwrap();
        rates.replace(
            RateTable::east_africa()
                .with_rates([("KES", dec!(130))])
                .unwrap(),
        );
        let refreshed = cache.get_or_compute(id, dec!(1)).await.unwrap();

        assert_eq!(refreshed.rates_revision, 1);
        assert_eq!(refreshed.quotes[0].amount, dec!(130));
    }

    #[tokio::test]
    async fn test_invalidate_drops_memory_and_store() {
        let store = Arc::new(FlakyStore::default());
        let cache = PriceCache::new(SharedRates::default()).with_store(store.clone());
        let id = ProductId::new();

        cache.get_or_compute(id, dec!(5)).await.unwrap();
        assert_eq!(cache.len(), 1);
        assert!(store.records.lock().unwrap().contains_key(&id));

        cache.invalidate(id).await;
        assert!(cache.is_empty());
        assert!(store.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persisted_record_is_reused() {
        let store = Arc::new(FlakyStore::default());
        let id = ProductId::new();

        let warm = PriceCache::new(SharedRates::default()).with_store(store.clone());
        let original = warm.get_or_compute(id, dec!(7)).await.unwrap();

        let cold = PriceCache::new(SharedRates::default()).with_store(store.clone());
        let reused = cold.get_or_compute(id, dec!(7)).await.unwrap();

        assert_eq!(reused.computed_at, original.computed_at);
    }

    #[tokio::test]
    async fn test_store_failures_are_retried() {
        let store = Arc::new(FlakyStore::failing(1));
        let cache = PriceCache::new(SharedRates::default())
            .with_store(store.clone())
            .with_retry(no_backoff(2));

        let prices = cache.get_or_compute(ProductId::new(), dec!(3)).await.unwrap();

        assert_eq!(prices.quotes.len(), 4);
        // failed load, retried load, save
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
        assert_eq!(store.records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_falls_back_to_computation() {
        let store = Arc::new(FlakyStore::failing(u32::MAX));
        let cache = PriceCache::new(SharedRates::default())
            .with_store(store.clone())
            .with_retry(no_backoff(1));

        let prices = cache.get_or_compute(ProductId::new(), dec!(2)).await.unwrap();

        assert_eq!(prices.quotes[1].amount, dec!(7164.68));
        assert!(store.records.lock().unwrap().is_empty());
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_negative_price_is_rejected() {
        let cache = PriceCache::new(SharedRates::default());
        let result = cache.get_or_compute(ProductId::new(), dec!(-1)).await;
        assert!(matches!(result, Err(PricingError::InvalidAmount(_))));
        assert!(cache.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_see_complete_sets() {
        let cache = Arc::new(PriceCache::new(SharedRates::default()));
        let id = ProductId::new();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.get_or_compute(id, dec!(12.34)).await })
            })
            .collect();

        for handle in handles {
            let prices = handle.await.unwrap().unwrap();
            assert_eq!(prices.quotes.len(), 4);
            assert_eq!(prices.base_price_usd, dec!(12.34));
        }
        assert_eq!(cache.len(), 1);
    }
}
