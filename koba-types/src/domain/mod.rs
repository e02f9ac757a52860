//! Domain models for the pricing service.

pub mod prices;
pub mod product;

pub use prices::CachedPrices;
pub use product::{Product, ProductId, validate_price};
