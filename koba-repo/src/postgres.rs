//! PostgreSQL repository adapter.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use koba_types::{
    CachedPrices, CreateProductRequest, DomainError, PriceCacheStore, Product, ProductId,
    ProductRepository, RepoError,
};

use crate::types::pg::{DbCachedPrices, DbProduct};
use crate::types::quotes_to_json;

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository.
#[derive(Clone)]
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_products_pg.sql"),
        "0001",
    )
    .await?;

    execute_migration(
        pool,
        include_str!("../migrations/0002_create_product_prices_pg.sql"),
        "0002",
    )
    .await?;

    Ok(())
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ProductRepository for PostgresRepo {
    async fn create_product(&self, req: CreateProductRequest) -> Result<Product, RepoError> {
        let mut product = Product::new(req.name, req.base_price_usd)?;
        product.description = req.description;
        product.category = req.category;
        product.image_url = req.image_url;
        product.in_stock = req.in_stock;

        let row: DbProduct = sqlx::query_as(
            r#"INSERT INTO products (id, name, description, category, image_url, base_price_usd, in_stock, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING id, name, description, category, image_url, base_price_usd, in_stock, created_at, updated_at"#,
        )
        .bind(product.id.into_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(product.base_price_usd)
        .bind(product.in_stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(row.into_domain())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepoError> {
        let row: Option<DbProduct> = sqlx::query_as(
            r#"SELECT id, name, description, category, image_url, base_price_usd, in_stock, created_at, updated_at
               FROM products WHERE id = $1"#,
        )
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(row.map(DbProduct::into_domain))
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepoError> {
        let rows: Vec<DbProduct> = sqlx::query_as(
            r#"SELECT id, name, description, category, image_url, base_price_usd, in_stock, created_at, updated_at
               FROM products ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(DbProduct::into_domain).collect())
    }

    async fn update_base_price(
        &self,
        id: ProductId,
        price: Decimal,
    ) -> Result<Product, RepoError> {
        koba_types::domain::validate_price(price)?;

        let row: Option<DbProduct> = sqlx::query_as(
            r#"UPDATE products SET base_price_usd = $1, updated_at = NOW()
               WHERE id = $2
               RETURNING id, name, description, category, image_url, base_price_usd, in_stock, created_at, updated_at"#,
        )
        .bind(price)
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbProduct::into_domain)
            .ok_or_else(|| DomainError::ProductNotFound(id).into())
    }
}

#[async_trait]
impl PriceCacheStore for PostgresRepo {
    async fn load_prices(&self, id: ProductId) -> Result<Option<CachedPrices>, RepoError> {
        let row: Option<DbCachedPrices> = sqlx::query_as(
            r#"SELECT product_id, base_price_usd, rates_revision, quotes, computed_at
               FROM product_prices WHERE product_id = $1"#,
        )
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbCachedPrices::into_domain).transpose()
    }

    async fn save_prices(&self, prices: &CachedPrices) -> Result<(), RepoError> {
        let quotes = quotes_to_json(&prices.quotes)?;

        sqlx::query(
            r#"INSERT INTO product_prices (product_id, base_price_usd, rates_revision, quotes, computed_at)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT (product_id) DO UPDATE SET
                   base_price_usd = EXCLUDED.base_price_usd,
                   rates_revision = EXCLUDED.rates_revision,
                   quotes = EXCLUDED.quotes,
                   computed_at = EXCLUDED.computed_at"#,
        )
        .bind(prices.product_id.into_uuid())
        .bind(prices.base_price_usd)
        .bind(prices.rates_revision as i64)
        .bind(quotes)
        .bind(prices.computed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(())
    }

    async fn remove_prices(&self, id: ProductId) -> Result<(), RepoError> {
        sqlx::query(r#"DELETE FROM product_prices WHERE product_id = $1"#)
            .bind(id.into_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(())
    }
}
