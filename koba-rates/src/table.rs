//! The rate table: currency code -> (rate, symbol, country, name).
//!
//! Rates are expressed as units of the currency per 1 USD. A table always
//! contains USD at rate 1 and keeps entries in insertion order, which is the
//! order quote sets are produced in.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::RateError;

/// Code of the base currency every rate is expressed against.
pub const BASE_CURRENCY: &str = "USD";

// ─────────────────────────────────────────────────────────────────────────────
// Currency Code
// ─────────────────────────────────────────────────────────────────────────────

/// Three-letter currency code, always stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "KES")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses a code case-insensitively, ignoring surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, RateError> {
        let code = raw.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(RateError::UnknownCurrency(raw.trim().to_string()));
        }
        Ok(Self(code))
    }

    /// The base currency.
    pub fn usd() -> Self {
        Self(BASE_CURRENCY.to_string())
    }

    pub(crate) fn from_static(code: &'static str) -> Self {
        Self(code.to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_usd(&self) -> bool {
        self.0 == BASE_CURRENCY
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = RateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Currency Info
// ─────────────────────────────────────────────────────────────────────────────

/// One row of the rate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CurrencyInfo {
    /// ISO currency code
    pub code: CurrencyCode,
    /// Display name
    #[serde(default)]
    #[schema(example = "Kenyan Shilling")]
    pub name: String,
    /// Display symbol; the code is shown when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "KSh")]
    pub symbol: Option<String>,
    /// Country using this currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Kenya")]
    pub country: Option<String>,
    /// Units of this currency per 1 USD
    #[schema(value_type = f64, example = 128.5)]
    pub rate: Decimal,
}

impl CurrencyInfo {
    pub fn new(code: CurrencyCode, rate: Decimal) -> Self {
        Self {
            code,
            name: String::new(),
            symbol: None,
            country: None,
            rate,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Symbol for display, falling back to the code.
    pub fn display_symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or(self.code.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate Table
// ─────────────────────────────────────────────────────────────────────────────

/// Immutable, validated mapping of currency code to rate and metadata.
#[derive(Debug, Clone)]
pub struct RateTable {
    entries: Vec<CurrencyInfo>,
    index: HashMap<CurrencyCode, usize>,
    base: usize,
    revision: u64,
}

impl RateTable {
    pub fn builder() -> RateTableBuilder {
        RateTableBuilder::default()
    }

    /// Builds a table from entries, enforcing the table invariants.
    pub fn from_entries(entries: Vec<CurrencyInfo>) -> Result<Self, RateError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if entry.rate <= Decimal::ZERO {
                return Err(RateError::InvalidTable(format!(
                    "rate for {} must be positive, got {}",
                    entry.code, entry.rate
                )));
            }
            if index.insert(entry.code.clone(), i).is_some() {
                return Err(RateError::InvalidTable(format!(
                    "duplicate currency {}",
                    entry.code
                )));
            }
        }

        let base = *index
            .get(&CurrencyCode::usd())
            .ok_or_else(|| RateError::InvalidTable("USD entry is required".into()))?;
        if entries[base].rate != Decimal::ONE {
            return Err(RateError::InvalidTable(format!(
                "USD rate must be 1, got {}",
                entries[base].rate
            )));
        }

        Ok(Self {
            entries,
            index,
            base,
            revision: 0,
        })
    }

    /// Parses a JSON array of currency entries.
    pub fn from_json(json: &str) -> Result<Self, RateError> {
        let entries: Vec<CurrencyInfo> =
            serde_json::from_str(json).map_err(|e| RateError::InvalidTable(e.to_string()))?;
        Self::from_entries(entries)
    }

    /// Builds a table from compile-time entries without validation.
    pub(crate) fn from_trusted(entries: Vec<CurrencyInfo>) -> Self {
        let index: HashMap<_, _> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.code.clone(), i))
            .collect();
        let base = index.get(&CurrencyCode::usd()).copied().unwrap_or(0);
        Self {
            entries,
            index,
            base,
            revision: 0,
        }
    }

    /// Returns a copy with the rates of known currencies replaced.
    ///
    /// Codes the table does not know are ignored and USD stays at 1; the
    /// result is validated like any other table.
    pub fn with_rates<I, K>(&self, rates: I) -> Result<Self, RateError>
    where
        I: IntoIterator<Item = (K, Decimal)>,
        K: AsRef<str>,
    {
        let mut entries = self.entries.clone();
        for (code, rate) in rates {
            let Ok(code) = CurrencyCode::parse(code.as_ref()) else {
                continue;
            };
            if code.is_usd() {
                continue;
            }
            if let Some(&i) = self.index.get(&code) {
                entries[i].rate = rate;
            }
        }
        Self::from_entries(entries)
    }

    pub(crate) fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    /// Revision of this snapshot; 0 until published through `SharedRates`.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, code: impl AsRef<str>) -> Option<&CurrencyInfo> {
        let code = CurrencyCode::parse(code.as_ref()).ok()?;
        self.index.get(&code).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, code: impl AsRef<str>) -> bool {
        self.get(code).is_some()
    }

    pub fn rate_for(&self, code: impl AsRef<str>) -> Result<Decimal, RateError> {
        let code = code.as_ref();
        self.get(code)
            .map(|info| info.rate)
            .ok_or_else(|| RateError::UnknownCurrency(code.trim().to_ascii_uppercase()))
    }

    /// Registered symbol for `code`, or the uppercased code itself.
    ///
    /// Never fails: callers rely on this for display of codes the table
    /// does not carry a symbol for.
    pub fn symbol_for<'a>(&'a self, code: &str) -> Cow<'a, str> {
        match self.get(code).and_then(|info| info.symbol.as_deref()) {
            Some(symbol) => Cow::Borrowed(symbol),
            None => Cow::Owned(code.trim().to_ascii_uppercase()),
        }
    }

    pub fn country_for(&self, code: impl AsRef<str>) -> Option<&str> {
        self.get(code).and_then(|info| info.country.as_deref())
    }

    /// Currency used in `country`, matched case-insensitively; USD otherwise.
    pub fn currency_for_country(&self, country: &str) -> &CurrencyInfo {
        let country = country.trim();
        self.entries
            .iter()
            .find(|info| {
                info.country
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(country))
            })
            .unwrap_or(&self.entries[self.base])
    }

    /// Every code except USD, in table order.
    pub fn all_codes(&self) -> Vec<CurrencyCode> {
        self.targets().map(|info| info.code.clone()).collect()
    }

    /// Entries except USD, in table order.
    pub fn targets(&self) -> impl Iterator<Item = &CurrencyInfo> {
        self.entries.iter().filter(|info| !info.code.is_usd())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CurrencyInfo> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::east_africa()
    }
}

/// Incremental constructor for [`RateTable`].
#[derive(Debug, Default)]
pub struct RateTableBuilder {
    entries: Vec<CurrencyInfo>,
}

impl RateTableBuilder {
    pub fn currency(mut self, info: CurrencyInfo) -> Self {
        self.entries.push(info);
        self
    }

    pub fn build(self) -> Result<RateTable, RateError> {
        RateTable::from_entries(self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    #[test]
    fn test_code_parse_is_case_insensitive() {
        assert_eq!(code(" ugx ").as_str(), "UGX");
        assert!(CurrencyCode::parse("K$S").is_err());
        assert!(CurrencyCode::parse("").is_err());
    }

    #[test]
    fn test_default_table_is_valid() {
        let table = RateTable::east_africa();
        let rebuilt = RateTable::from_entries(table.iter().cloned().collect()).unwrap();
        assert_eq!(rebuilt.len(), 5);
    }

    #[test]
    fn test_rate_lookup() {
        let table = RateTable::east_africa();
        assert_eq!(table.rate_for("kes").unwrap(), dec!(128.5));
        assert_eq!(table.rate_for("USD").unwrap(), Decimal::ONE);
        assert_eq!(
            table.rate_for("eur"),
            Err(RateError::UnknownCurrency("EUR".into()))
        );
    }

    #[test]
    fn test_all_codes_excludes_usd_in_order() {
        let codes: Vec<String> = RateTable::east_africa()
            .all_codes()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(codes, vec!["KES", "UGX", "BIF", "CDF"]);
    }

    #[test]
    fn test_symbol_falls_back_to_code() {
        let table = RateTable::builder()
            .currency(CurrencyInfo::new(CurrencyCode::usd(), Decimal::ONE).with_symbol("$"))
            .currency(CurrencyInfo::new(code("TZS"), dec!(2500)))
            .build()
            .unwrap();

        assert_eq!(table.symbol_for("USD"), "$");
        assert_eq!(table.symbol_for("tzs"), "TZS");
        assert_eq!(table.symbol_for("xyz"), "XYZ");
        assert!(table.rate_for("XYZ").is_err());
    }

    #[test]
    fn test_builder_rejects_bad_tables() {
        let missing_usd = RateTable::builder()
            .currency(CurrencyInfo::new(code("KES"), dec!(128.5)))
            .build();
        assert!(matches!(missing_usd, Err(RateError::InvalidTable(_))));

        let wrong_base = RateTable::builder()
            .currency(CurrencyInfo::new(CurrencyCode::usd(), dec!(2)))
            .build();
        assert!(matches!(wrong_base, Err(RateError::InvalidTable(_))));

        let zero_rate = RateTable::builder()
            .currency(CurrencyInfo::new(CurrencyCode::usd(), Decimal::ONE))
            .currency(CurrencyInfo::new(code("KES"), Decimal::ZERO))
            .build();
        assert!(matches!(zero_rate, Err(RateError::InvalidTable(_))));

        let duplicate = RateTable::builder()
            .currency(CurrencyInfo::new(CurrencyCode::usd(), Decimal::ONE))
            .currency(CurrencyInfo::new(code("KES"), dec!(1)))
            .currency(CurrencyInfo::new(code("kes"), dec!(2)))
            .build();
        assert!(matches!(duplicate, Err(RateError::InvalidTable(_))));
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"code": "USD", "name": "US Dollar", "symbol": "$", "rate": 1.0},
            {"code": "kes", "name": "Kenyan Shilling", "country": "Kenya", "rate": 130.25}
        ]"#;
        let table = RateTable::from_json(json).unwrap();
        assert_eq!(table.rate_for("KES").unwrap(), dec!(130.25));
        assert_eq!(table.country_for("KES"), Some("Kenya"));
        assert_eq!(table.symbol_for("KES"), "KES");

        assert!(RateTable::from_json("{not json").is_err());
    }

    #[test]
    fn test_currency_for_country() {
        let table = RateTable::east_africa();
        assert_eq!(table.currency_for_country("uganda").code.as_str(), "UGX");
        assert_eq!(table.currency_for_country("DRC Congo").code.as_str(), "CDF");
        assert_eq!(table.currency_for_country("Rwanda").code.as_str(), "USD");
    }

    #[test]
    fn test_with_rates_replaces_known_codes_only() {
        let table = RateTable::east_africa();
        let updated = table
            .with_rates([("KES", dec!(129.1)), ("EUR", dec!(0.9)), ("USD", dec!(7))])
            .unwrap();

        assert_eq!(updated.rate_for("KES").unwrap(), dec!(129.1));
        assert_eq!(updated.rate_for("USD").unwrap(), Decimal::ONE);
        assert!(!updated.contains("EUR"));
        assert_eq!(updated.country_for("KES"), Some("Kenya"));
        assert_eq!(table.rate_for("KES").unwrap(), dec!(128.5));

        assert!(table.with_rates([("UGX", dec!(-1))]).is_err());
    }
}
