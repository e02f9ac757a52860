//! Rate Table and Pricing Engine for the Koba storefront.
//!
//! Product prices are stored in USD and shown in East African currencies.
//! This crate holds the rate table (code -> rate, symbol, country), the pure
//! pricing engine that converts USD amounts against one table snapshot, and
//! a shared handle that lets a refresh publish a new snapshot atomically.
//!
//! # Adding a New Currency
//! Add a line to the `define_currencies!` invocation below:
//! ```ignore
//! define_currencies! {
//!     // ... existing currencies ...
//!     TZS => ("TZS", "TSh", "Tanzanian Shilling", "Tanzania", dec!(2510.0)),
//! }
//! ```
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use koba_rates::{PricingEngine, RateTable};
//! use rust_decimal_macros::dec;
//!
//! let engine = PricingEngine::new(Arc::new(RateTable::east_africa()));
//! let quote = engine.convert(dec!(29.99), "kes").unwrap();
//! assert_eq!(quote.amount, dec!(3853.72));
//! assert_eq!(quote.symbol, "KSh");
//! ```

use rust_decimal_macros::dec;

pub mod engine;
pub mod error;
pub mod shared;
pub mod table;

pub use engine::{Conversion, Money, PriceQuote, PricingEngine, parse_amount, round_cents};
pub use error::{PricingError, RateError};
pub use shared::SharedRates;
pub use table::{BASE_CURRENCY, CurrencyCode, CurrencyInfo, RateTable, RateTableBuilder};

// ─────────────────────────────────────────────────────────────────────────────
// THE MACRO: declares code constants and the default table
// ─────────────────────────────────────────────────────────────────────────────

/// Declares the default currencies.
///
/// # Syntax
/// ```ignore
/// define_currencies! {
///     NAME => ("CODE", "SYMBOL", "display name", "country", rate_per_usd),
/// }
/// ```
/// USD must be listed first with rate 1.
macro_rules! define_currencies {
    (
        $(
            $name:ident => ($code:literal, $symbol:literal, $display:literal, $country:literal, $rate:expr)
        ),* $(,)?
    ) => {
        $(
            pub const $name: &str = $code;
        )*

        impl RateTable {
            /// The built-in East African table.
            pub fn east_africa() -> Self {
                RateTable::from_trusted(vec![
                    $(
                        CurrencyInfo {
                            code: CurrencyCode::from_static($code),
                            name: $display.to_string(),
                            symbol: Some($symbol.to_string()),
                            country: Some($country.to_string()),
                            rate: $rate,
                        }
                    ),*
                ])
            }
        }
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// CURRENCY DEFINITIONS - Add new currencies here!
// ─────────────────────────────────────────────────────────────────────────────

define_currencies! {
    USD => ("USD", "$", "US Dollar", "United States", dec!(1.0)),
    KES => ("KES", "KSh", "Kenyan Shilling", "Kenya", dec!(128.5)),
    UGX => ("UGX", "USh", "Ugandan Shilling", "Uganda", dec!(3582.34)),
    BIF => ("BIF", "FBu", "Burundi Franc", "Burundi", dec!(2850.0)),
    CDF => ("CDF", "FC", "Congolese Franc", "DRC Congo", dec!(2700.0)),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_constants_resolve() {
        let table = RateTable::east_africa();
        for code in [USD, KES, UGX, BIF, CDF] {
            assert!(table.contains(code), "{} missing", code);
        }
    }

    #[test]
    fn test_default_table_metadata() {
        let table = RateTable::default();
        assert_eq!(table.symbol_for(BIF), "FBu");
        assert_eq!(table.country_for(CDF), Some("DRC Congo"));
        assert_eq!(table.get(UGX).map(|c| c.name.as_str()), Some("Ugandan Shilling"));
    }
}
