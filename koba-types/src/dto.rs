//! Data Transfer Objects (DTOs) for requests and responses.

use koba_rates::{CurrencyCode, CurrencyInfo, PriceQuote, PricingError, parse_amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Product, ProductId};

// ─────────────────────────────────────────────────────────────────────────────
// Product DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a new product.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    #[schema(example = "Queen Koba Glow Serum")]
    pub name: String,
    /// Canonical price in USD
    #[schema(value_type = f64, example = 29.99)]
    pub base_price_usd: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[schema(example = "serums")]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

fn default_in_stock() -> bool {
    true
}

/// Request to change a product's USD base price.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdatePriceRequest {
    #[schema(value_type = f64, example = 34.5)]
    pub base_price_usd: Decimal,
}

/// A product together with its regional prices.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PricedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub prices: Vec<PriceQuote>,
}

/// All regional prices of one product.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductPricesResponse {
    pub product_id: ProductId,
    pub product_name: String,
    #[schema(value_type = f64, example = 29.99)]
    pub base_price_usd: Decimal,
    pub prices: Vec<PriceQuote>,
}

/// Query string for the product prices endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PriceQuery {
    /// Restrict the answer to one currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Currency DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// The rate table currently in use.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrencyListResponse {
    pub base: CurrencyCode,
    pub revision: u64,
    pub currencies: Vec<CurrencyInfo>,
}

/// An amount as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(serde_json::Number),
    Text(String),
}

impl AmountInput {
    /// Parses into a non-negative decimal.
    pub fn parse(&self) -> Result<Decimal, PricingError> {
        match self {
            AmountInput::Number(n) => parse_amount(&n.to_string()),
            AmountInput::Text(s) => parse_amount(s),
        }
    }
}

impl From<Decimal> for AmountInput {
    fn from(value: Decimal) -> Self {
        AmountInput::Text(value.to_string())
    }
}

/// Request to convert an amount between two currencies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConvertRequest {
    #[schema(value_type = f64, example = 29.99)]
    pub amount: AmountInput,
    #[serde(default = "default_from")]
    #[schema(example = "USD")]
    pub from: String,
    #[serde(default = "default_to")]
    #[schema(example = "KES")]
    pub to: String,
}

fn default_from() -> String {
    koba_rates::USD.to_string()
}

fn default_to() -> String {
    koba_rates::KES.to_string()
}

/// An amount with its currency and display symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DisplayAmount {
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub symbol: String,
}

/// Response of a conversion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConvertResponse {
    pub original: DisplayAmount,
    pub converted: DisplayAmount,
    /// Units of `to` per unit of `from`
    #[schema(value_type = f64)]
    pub rate: Decimal,
}

// ─────────────────────────────────────────────────────────────────────────────
// Order quote DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// One cart line.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub product_id: ProductId,
    #[schema(example = 2)]
    pub quantity: u32,
}

/// Request to price a cart in one currency.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderQuoteRequest {
    pub items: Vec<OrderLine>,
    #[serde(default = "default_to")]
    #[schema(example = "KES")]
    pub currency: String,
}

/// A priced cart line.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderLineQuote {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    #[schema(value_type = f64)]
    pub unit_price_usd: Decimal,
    #[schema(value_type = f64)]
    pub line_total_usd: Decimal,
}

/// Cart total in USD and in the requested currency.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderQuoteResponse {
    pub lines: Vec<OrderLineQuote>,
    #[schema(value_type = f64)]
    pub total_usd: Decimal,
    pub total: PriceQuote,
}
