//! Error types for rate lookups and price conversion.

/// Errors raised by the rate table itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateError {
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Invalid rate table: {0}")]
    InvalidTable(String),
}

/// Errors raised by the pricing engine.
///
/// Both variants are caller mistakes; the engine never fails for any other
/// reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

impl PricingError {
    /// Stable machine-readable identifier for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            PricingError::UnsupportedCurrency(_) => "unsupported_currency",
            PricingError::InvalidAmount(_) => "invalid_amount",
        }
    }
}
