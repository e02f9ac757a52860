//! Database row types, one set per backend.
//!
//! SQLite stores ids, decimals and timestamps as TEXT; PostgreSQL uses
//! native UUID, NUMERIC, TIMESTAMPTZ and JSONB columns.

use koba_types::{CachedPrices, PriceQuote, Product, ProductId, RepoError};

fn quotes_from_json(value: serde_json::Value) -> Result<Vec<PriceQuote>, RepoError> {
    serde_json::from_value(value).map_err(|e| RepoError::Serialization(e.to_string()))
}

pub fn quotes_to_json(quotes: &[PriceQuote]) -> Result<serde_json::Value, RepoError> {
    serde_json::to_value(quotes).map_err(|e| RepoError::Serialization(e.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite rows
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "sqlite")]
pub mod sqlite {
    use std::str::FromStr;

    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;
    use sqlx::FromRow;

    use super::*;

    /// Product row from database.
    #[derive(FromRow)]
    pub struct DbProduct {
        pub id: String,
        pub name: String,
        pub description: String,
        pub category: String,
        pub image_url: String,
        pub base_price_usd: String,
        pub in_stock: i64,
        pub created_at: String,
        pub updated_at: String,
    }

    /// Persisted quote set row.
    #[derive(FromRow)]
    pub struct DbCachedPrices {
        pub product_id: String,
        pub base_price_usd: String,
        pub rates_revision: i64,
        pub quotes: String,
        pub computed_at: String,
    }

    pub fn parse_id(s: &str) -> Result<ProductId, RepoError> {
        s.parse().map_err(|e: uuid::Error| RepoError::Database(e.to_string()))
    }

    pub fn parse_decimal(s: &str) -> Result<Decimal, RepoError> {
        Decimal::from_str(s).map_err(|e| RepoError::Database(e.to_string()))
    }

    pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, RepoError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepoError::Database(e.to_string()))
    }

    impl DbProduct {
        pub fn into_domain(self) -> Result<Product, RepoError> {
            Ok(Product {
                id: parse_id(&self.id)?,
                name: self.name,
                description: self.description,
                category: self.category,
                image_url: self.image_url,
                base_price_usd: parse_decimal(&self.base_price_usd)?,
                in_stock: self.in_stock != 0,
                created_at: parse_timestamp(&self.created_at)?,
                updated_at: parse_timestamp(&self.updated_at)?,
            })
        }
    }

    impl DbCachedPrices {
        pub fn into_domain(self) -> Result<CachedPrices, RepoError> {
            let quotes = serde_json::from_str(&self.quotes)
                .map_err(|e| RepoError::Serialization(e.to_string()))?;

            Ok(CachedPrices {
                product_id: parse_id(&self.product_id)?,
                base_price_usd: parse_decimal(&self.base_price_usd)?,
                rates_revision: self.rates_revision as u64,
                quotes: quotes_from_json(quotes)?,
                computed_at: parse_timestamp(&self.computed_at)?,
            })
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL rows
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "postgres")]
pub mod pg {
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;
    use sqlx::FromRow;
    use uuid::Uuid;

    use super::*;

    /// Product row from database.
    #[derive(FromRow)]
    pub struct DbProduct {
        pub id: Uuid,
        pub name: String,
        pub description: String,
        pub category: String,
        pub image_url: String,
        pub base_price_usd: Decimal,
        pub in_stock: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Persisted quote set row.
    #[derive(FromRow)]
    pub struct DbCachedPrices {
        pub product_id: Uuid,
        pub base_price_usd: Decimal,
        pub rates_revision: i64,
        pub quotes: serde_json::Value,
        pub computed_at: DateTime<Utc>,
    }

    impl DbProduct {
        pub fn into_domain(self) -> Product {
            Product {
                id: ProductId::from_uuid(self.id),
                name: self.name,
                description: self.description,
                category: self.category,
                image_url: self.image_url,
                base_price_usd: self.base_price_usd,
                in_stock: self.in_stock,
                created_at: self.created_at,
                updated_at: self.updated_at,
            }
        }
    }

    impl DbCachedPrices {
        pub fn into_domain(self) -> Result<CachedPrices, RepoError> {
            Ok(CachedPrices {
                product_id: ProductId::from_uuid(self.product_id),
                base_price_usd: self.base_price_usd,
                rates_revision: self.rates_revision as u64,
                quotes: quotes_from_json(self.quotes)?,
                computed_at: self.computed_at,
            })
        }
    }
}
