//! Error types for the pricing service.

use koba_rates::PricingError;

/// Domain-level errors (business rule violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Price cannot be negative")]
    NegativePrice,

    #[error("Product not found: {0}")]
    ProductNotFound(crate::domain::ProductId),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Price cache backend unavailable: {0}")]
    CacheBackendUnavailable(String),

    #[error("Entity not found")]
    NotFound,
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes; `kind()` is the stable
/// machine-readable name surfaced to clients.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::UnsupportedCurrency(_) => "unsupported_currency",
            AppError::InvalidAmount(_) => "invalid_amount",
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::UnsupportedCurrency(code) => AppError::UnsupportedCurrency(code),
            PricingError::InvalidAmount(msg) => AppError::InvalidAmount(msg),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NegativePrice => AppError::InvalidAmount(err.to_string()),
            DomainError::ProductNotFound(id) => {
                AppError::NotFound(format!("Product not found: {}", id))
            }
            DomainError::ValidationError(msg) => AppError::BadRequest(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Serialization(e) => AppError::Internal(e),
            RepoError::CacheBackendUnavailable(e) => AppError::Internal(e),
        }
    }
}
