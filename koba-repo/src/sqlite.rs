//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use koba_types::{
    CachedPrices, CreateProductRequest, DomainError, PriceCacheStore, Product, ProductId,
    ProductRepository, RepoError,
};

use crate::types::quotes_to_json;
use crate::types::sqlite::{DbCachedPrices, DbProduct};

const PRODUCT_COLUMNS: &str =
    "id, name, description, category, image_url, base_price_usd, in_stock, created_at, updated_at";

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
#[derive(Clone)]
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to an in-memory database is a separate database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        for ddl in [
            include_str!("../migrations/0001_create_products.sql"),
            include_str!("../migrations/0002_create_product_prices.sql"),
        ] {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ProductRepository for SqliteRepo {
    async fn create_product(&self, req: CreateProductRequest) -> Result<Product, RepoError> {
        // Validate first
        let mut product = Product::new(req.name, req.base_price_usd)?;
        product.description = req.description;
        product.category = req.category;
        product.image_url = req.image_url;
        product.in_stock = req.in_stock;

        sqlx::query(
            r#"INSERT INTO products (id, name, description, category, image_url, base_price_usd, in_stock, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(product.id.to_string())
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(product.base_price_usd.to_string())
        .bind(product.in_stock as i64)
        .bind(product.created_at.to_rfc3339())
        .bind(product.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(product)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepoError> {
        let row: Option<DbProduct> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbProduct::into_domain).transpose()
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepoError> {
        let rows: Vec<DbProduct> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbProduct::into_domain).collect()
    }

    async fn update_base_price(
        &self,
        id: ProductId,
        price: Decimal,
    ) -> Result<Product, RepoError> {
        let mut product = self
            .get_product(id)
            .await?
            .ok_or(DomainError::ProductNotFound(id))?;
        product.set_base_price(price)?;

        sqlx::query(r#"UPDATE products SET base_price_usd = ?, updated_at = ? WHERE id = ?"#)
            .bind(product.base_price_usd.to_string())
            .bind(product.updated_at.to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(product)
    }
}

#[async_trait]
impl PriceCacheStore for SqliteRepo {
    async fn load_prices(&self, id: ProductId) -> Result<Option<CachedPrices>, RepoError> {
        let row: Option<DbCachedPrices> = sqlx::query_as(
            r#"SELECT product_id, base_price_usd, rates_revision, quotes, computed_at
               FROM product_prices WHERE product_id = ?"#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbCachedPrices::into_domain).transpose()
    }

    async fn save_prices(&self, prices: &CachedPrices) -> Result<(), RepoError> {
        let quotes = quotes_to_json(&prices.quotes)?;

        sqlx::query(
            r#"INSERT INTO product_prices (product_id, base_price_usd, rates_revision, quotes, computed_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (product_id) DO UPDATE SET
                   base_price_usd = excluded.base_price_usd,
                   rates_revision = excluded.rates_revision,
                   quotes = excluded.quotes,
                   computed_at = excluded.computed_at"#,
        )
        .bind(prices.product_id.to_string())
        .bind(prices.base_price_usd.to_string())
        .bind(prices.rates_revision as i64)
        .bind(quotes.to_string())
        .bind(prices.computed_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(())
    }

    async fn remove_prices(&self, id: ProductId) -> Result<(), RepoError> {
        sqlx::query(r#"DELETE FROM product_prices WHERE product_id = ?"#)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(())
    }
}
