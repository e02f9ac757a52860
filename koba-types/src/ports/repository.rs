//! Repository port traits.
//!
//! Adapters (Postgres, SQLite) implement both traits; the price cache store
//! is optional for the application, the product repository is not.

use rust_decimal::Decimal;

use crate::domain::{CachedPrices, Product, ProductId};
use crate::dto::CreateProductRequest;
use crate::error::RepoError;

/// Catalogue access.
#[async_trait::async_trait]
pub trait ProductRepository: Send + Sync + 'static {
    /// Creates a new product.
    async fn create_product(&self, req: CreateProductRequest) -> Result<Product, RepoError>;

    /// Gets a product by ID.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepoError>;

    /// Lists all products, newest first.
    async fn list_products(&self) -> Result<Vec<Product>, RepoError>;

    /// Replaces the USD base price. Fails with `NotFound` for unknown IDs.
    async fn update_base_price(
        &self,
        id: ProductId,
        price: Decimal,
    ) -> Result<Product, RepoError>;
}

/// Persistent backing store for computed quote sets.
///
/// Records are written and read whole, keyed by product.
#[async_trait::async_trait]
pub trait PriceCacheStore: Send + Sync + 'static {
    async fn load_prices(&self, id: ProductId) -> Result<Option<CachedPrices>, RepoError>;

    async fn save_prices(&self, prices: &CachedPrices) -> Result<(), RepoError>;

    async fn remove_prices(&self, id: ProductId) -> Result<(), RepoError>;
}
