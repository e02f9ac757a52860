//! # Koba Types
//!
//! Domain types and port traits for the Koba pricing service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! - `domain/` - Products and cached quote sets
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types
//!
//! Currency types come from `koba-rates` and are re-exported here.

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{CachedPrices, Product, ProductId};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use koba_rates::{
    Conversion, CurrencyCode, CurrencyInfo, Money, PriceQuote, PricingEngine, PricingError,
    RateTable, SharedRates,
};
pub use ports::{PriceCacheStore, ProductRepository, RateFeedError, RateProvider};
