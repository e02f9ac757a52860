//! # Koba Hex
//!
//! Application service layer and HTTP adapter for the pricing service.
//!
//! ## Architecture
//!
//! - `cache` - Per-product price cache over an optional persistent store
//! - `service` - Application service (orchestrates pricing operations)
//! - `refresh` - Background exchange rate refresh
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The service is generic over `R: ProductRepository`, allowing
//! different repository implementations to be injected.

pub mod cache;
pub mod inbound;
pub mod openapi;
pub mod refresh;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use cache::{PriceCache, RetryPolicy};
pub use refresh::{RateRefresher, RefreshError};
pub use service::PricingService;
