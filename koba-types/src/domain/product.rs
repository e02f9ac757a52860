//! Product domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::DomainError;

/// Unique identifier for a Product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl ProductId {
    /// Creates a new random ProductId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a ProductId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A catalogue item priced in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: ProductId,
    #[schema(example = "Queen Koba Glow Serum")]
    pub name: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
    /// Canonical price in USD
    #[schema(value_type = f64, example = 29.99)]
    pub base_price_usd: Decimal,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new product.
    ///
    /// # Validation
    /// - Name cannot be empty
    /// - Base price cannot be negative
    pub fn new(name: String, base_price_usd: Decimal) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Product name cannot be empty".into(),
            ));
        }
        validate_price(base_price_usd)?;

        let now = Utc::now();
        Ok(Self {
            id: ProductId::new(),
            name,
            description: String::new(),
            category: String::new(),
            image_url: String::new(),
            base_price_usd,
            in_stock: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Changes the USD base price.
    pub fn set_base_price(&mut self, base_price_usd: Decimal) -> Result<(), DomainError> {
        validate_price(base_price_usd)?;
        self.base_price_usd = base_price_usd;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Rejects negative prices.
pub fn validate_price(price: Decimal) -> Result<(), DomainError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(DomainError::NegativePrice);
    }
    Ok(())
}
