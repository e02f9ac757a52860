//! Pricing engine: pure USD -> regional currency conversion.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::PricingError;
use crate::table::{CurrencyCode, CurrencyInfo, RateTable};

/// Rounds half-up (away from zero) to cents.
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses a user-supplied amount such as `"29.99"` or `"1e3"`.
pub fn parse_amount(raw: &str) -> Result<Decimal, PricingError> {
    let raw = raw.trim();
    let amount = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| PricingError::InvalidAmount(format!("'{}' is not a number", raw)))?;
    ensure_non_negative(amount)?;
    Ok(amount)
}

fn ensure_non_negative(amount: Decimal) -> Result<(), PricingError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PricingError::InvalidAmount(format!(
            "amount cannot be negative, got {}",
            amount
        )));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Money & Quotes
// ─────────────────────────────────────────────────────────────────────────────

/// A non-negative amount tagged with its currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Money {
    #[schema(value_type = f64, example = 29.99)]
    amount: Decimal,
    currency: CurrencyCode,
}

impl Money {
    pub fn new(amount: Decimal, currency: CurrencyCode) -> Result<Self, PricingError> {
        ensure_non_negative(amount)?;
        Ok(Self { amount, currency })
    }

    pub fn usd(amount: Decimal) -> Result<Self, PricingError> {
        Self::new(amount, CurrencyCode::usd())
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

/// A price in one target currency, derived from a USD amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PriceQuote {
    pub currency_code: CurrencyCode,
    /// Converted amount, rounded to cents
    #[schema(value_type = f64, example = 3853.72)]
    pub amount: Decimal,
    #[schema(example = "KSh")]
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Kenya")]
    pub country: Option<String>,
    /// Units of the target currency per 1 USD
    #[schema(value_type = f64, example = 128.5)]
    pub rate_used: Decimal,
}

/// Result of converting between two arbitrary currencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Conversion {
    pub original: Money,
    pub converted: Money,
    /// Units of the target currency per unit of the source currency
    #[schema(value_type = f64)]
    pub rate: Decimal,
}

// ─────────────────────────────────────────────────────────────────────────────
// Engine
// ─────────────────────────────────────────────────────────────────────────────

/// Converts USD amounts using one rate table snapshot.
///
/// Every method is deterministic for a given snapshot; cloning the engine
/// only clones the `Arc`.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    rates: Arc<RateTable>,
}

impl PricingEngine {
    pub fn new(rates: Arc<RateTable>) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Revision of the snapshot this engine prices with.
    pub fn revision(&self) -> u64 {
        self.rates.revision()
    }

    /// Converts a USD amount into `target`.
    pub fn convert(&self, amount_usd: Decimal, target: &str) -> Result<PriceQuote, PricingError> {
        ensure_non_negative(amount_usd)?;
        let info = self.lookup(target)?;
        self.quote(amount_usd, info)
    }

    /// Converts a USD amount into every non-USD currency, in table order.
    pub fn convert_all(&self, amount_usd: Decimal) -> Result<Vec<PriceQuote>, PricingError> {
        ensure_non_negative(amount_usd)?;
        self.rates
            .targets()
            .map(|info| self.quote(amount_usd, info))
            .collect()
    }

    /// Converts an amount in `source` back to USD, rounded to cents.
    pub fn convert_to_usd(&self, amount: Decimal, source: &str) -> Result<Money, PricingError> {
        ensure_non_negative(amount)?;
        let info = self.lookup(source)?;
        let amount_usd = amount
            .checked_div(info.rate)
            .ok_or_else(|| too_large(amount))?;
        Money::usd(round_cents(amount_usd))
    }

    /// Converts between any two currencies through USD, rounding once.
    pub fn convert_between(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> Result<Conversion, PricingError> {
        ensure_non_negative(amount)?;
        let source = self.lookup(from)?;
        let target = self.lookup(to)?;

        let converted = amount
            .checked_div(source.rate)
            .and_then(|usd| usd.checked_mul(target.rate))
            .map(round_cents)
            .ok_or_else(|| too_large(amount))?;

        let rate = target
            .rate
            .checked_div(source.rate)
            .ok_or_else(|| too_large(amount))?;

        Ok(Conversion {
            original: Money::new(amount, source.code.clone())?,
            converted: Money::new(converted, target.code.clone())?,
            rate: rate.normalize(),
        })
    }

    fn lookup(&self, code: &str) -> Result<&CurrencyInfo, PricingError> {
        self.rates
            .get(code)
            .ok_or_else(|| PricingError::UnsupportedCurrency(code.trim().to_ascii_uppercase()))
    }

    fn quote(&self, amount_usd: Decimal, info: &CurrencyInfo) -> Result<PriceQuote, PricingError> {
        let amount = amount_usd
            .checked_mul(info.rate)
            .map(round_cents)
            .ok_or_else(|| too_large(amount_usd))?;

        Ok(PriceQuote {
            currency_code: info.code.clone(),
            amount,
            symbol: info.display_symbol().to_string(),
            country: info.country.clone(),
            rate_used: info.rate,
        })
    }
}

fn too_large(amount: Decimal) -> PricingError {
    PricingError::InvalidAmount(format!("amount {} is too large to convert", amount))
}
