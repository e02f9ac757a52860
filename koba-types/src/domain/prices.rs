//! Cached quote sets for a product.

use chrono::{DateTime, Utc};
use koba_rates::{PriceQuote, RateTable};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::product::ProductId;

/// The last computed quote set for one product.
///
/// Stored whole and replaced whole; never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CachedPrices {
    pub product_id: ProductId,
    /// Base price the quotes were computed from
    #[schema(value_type = f64)]
    pub base_price_usd: Decimal,
    /// Revision of the rate table snapshot used
    pub rates_revision: u64,
    pub quotes: Vec<PriceQuote>,
    pub computed_at: DateTime<Utc>,
}

impl CachedPrices {
    pub fn new(
        product_id: ProductId,
        base_price_usd: Decimal,
        rates_revision: u64,
        quotes: Vec<PriceQuote>,
    ) -> Self {
        Self {
            product_id,
            base_price_usd,
            rates_revision,
            quotes,
            computed_at: Utc::now(),
        }
    }

    /// True when these quotes are what `rates` would produce for
    /// `base_price_usd`.
    ///
    /// Compares the rate recorded in each quote against the table instead of
    /// the revision number, so records persisted by an earlier process are
    /// judged by content.
    pub fn is_fresh(&self, base_price_usd: Decimal, rates: &RateTable) -> bool {
        if self.base_price_usd != base_price_usd {
            return false;
        }
        let mut targets = rates.targets();
        let all_match = self.quotes.iter().all(|quote| {
            targets.next().is_some_and(|info| {
                info.code == quote.currency_code
                    && info.rate == quote.rate_used
                    && info.display_symbol() == quote.symbol
                    && info.country == quote.country
            })
        });
        all_match && targets.next().is_none()
    }
}
