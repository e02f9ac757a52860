//! Pricing Application Service
//!
//! Orchestrates the catalogue repository, the rate table and the price
//! cache. Contains NO infrastructure logic - pure business orchestration.

use rust_decimal::Decimal;

use koba_types::{
    AppError, ConvertRequest, ConvertResponse, CreateProductRequest, CurrencyCode, CurrencyInfo,
    CurrencyListResponse, DisplayAmount, OrderLineQuote, OrderQuoteRequest, OrderQuoteResponse,
    PriceQuote, PricedProduct, Product, ProductId, ProductPricesResponse, ProductRepository,
    SharedRates, domain::validate_price,
};

use crate::cache::PriceCache;

/// Application service for pricing operations.
///
/// Generic over `R: ProductRepository` - the adapter is injected at compile
/// time. The rate table is injected through `SharedRates`, so tests can
/// price against any table without touching global state.
pub struct PricingService<R: ProductRepository> {
    repo: R,
    cache: PriceCache,
}

impl<R: ProductRepository> PricingService<R> {
    /// Creates a service with an in-memory price cache.
    pub fn new(repo: R, rates: SharedRates) -> Self {
        Self::with_cache(repo, PriceCache::new(rates))
    }

    /// Creates a service around an already configured cache.
    pub fn with_cache(repo: R, cache: PriceCache) -> Self {
        Self { repo, cache }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn rates(&self) -> &SharedRates {
        self.cache.rates()
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Currencies
    // ─────────────────────────────────────────────────────────────────────────────

    /// Lists the currencies of the current rate table.
    pub fn list_currencies(&self) -> CurrencyListResponse {
        let table = self.rates().snapshot();
        CurrencyListResponse {
            base: CurrencyCode::usd(),
            revision: table.revision(),
            currencies: table.iter().cloned().collect(),
        }
    }

    /// Currency used in a country; USD for countries outside the table.
    pub fn currency_for_country(&self, country: &str) -> CurrencyInfo {
        self.rates()
            .snapshot()
            .currency_for_country(country)
            .clone()
    }

    /// Converts an amount between two currencies.
    pub fn convert(&self, req: ConvertRequest) -> Result<ConvertResponse, AppError> {
        let amount = req.amount.parse()?;
        let engine = self.rates().engine();
        let conversion = engine.convert_between(amount, &req.from, &req.to)?;
        let table = engine.rates();

        let display = |money: &koba_types::Money| DisplayAmount {
            amount: money.amount(),
            currency: money.currency().clone(),
            symbol: table.symbol_for(money.currency().as_str()).into_owned(),
        };

        Ok(ConvertResponse {
            original: display(&conversion.original),
            converted: display(&conversion.converted),
            rate: conversion.rate,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Products
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates a product.
    pub async fn create_product(&self, req: CreateProductRequest) -> Result<Product, AppError> {
        if req.name.trim().is_empty() {
            return Err(AppError::BadRequest("Product name cannot be empty".into()));
        }
        validate_price(req.base_price_usd)?;

        self.repo.create_product(req).await.map_err(Into::into)
    }

    /// Gets a product by ID.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, AppError> {
        self.repo
            .get_product(id)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound(format!("Product {}", id))))
    }

    /// Lists all products with their regional prices.
    pub async fn list_products(&self) -> Result<Vec<PricedProduct>, AppError> {
        let products = self.repo.list_products().await?;

        let mut priced = Vec::with_capacity(products.len());
        for product in products {
            let prices = self
                .cache
                .get_or_compute(product.id, product.base_price_usd)
                .await?;
            priced.push(PricedProduct {
                prices: prices.quotes.clone(),
                product,
            });
        }
        Ok(priced)
    }

    /// All regional prices of a product.
    pub async fn product_prices(&self, id: ProductId) -> Result<ProductPricesResponse, AppError> {
        let product = self.get_product(id).await?;
        let prices = self
            .cache
            .get_or_compute(product.id, product.base_price_usd)
            .await?;

        Ok(ProductPricesResponse {
            product_id: product.id,
            product_name: product.name,
            base_price_usd: product.base_price_usd,
            prices: prices.quotes.clone(),
        })
    }

    /// The price of a product in one currency.
    pub async fn product_price(&self, id: ProductId, currency: &str) -> Result<PriceQuote, AppError> {
        let product = self.get_product(id).await?;
        let engine = self.rates().engine();
        let code = engine
            .rates()
            .get(currency)
            .map(|info| info.code.clone())
            .ok_or_else(|| AppError::UnsupportedCurrency(currency.trim().to_ascii_uppercase()))?;

        let prices = self
            .cache
            .get_or_compute(product.id, product.base_price_usd)
            .await?;
        match prices.quotes.iter().find(|q| q.currency_code == code) {
            Some(quote) => Ok(quote.clone()),
            // USD is not part of the cached set
            None => Ok(engine.convert(product.base_price_usd, code.as_str())?),
        }
    }

    /// Changes a product's base price and drops its cached quotes.
    pub async fn update_base_price(
        &self,
        id: ProductId,
        base_price_usd: Decimal,
    ) -> Result<Product, AppError> {
        validate_price(base_price_usd)?;

        let product = self.repo.update_base_price(id, base_price_usd).await?;
        self.cache.invalidate(id).await;

        tracing::info!(product_id = %id, %base_price_usd, "base price updated");
        Ok(product)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Orders
    // ─────────────────────────────────────────────────────────────────────────────

    /// Prices a cart in one currency.
    pub async fn quote_order(&self, req: OrderQuoteRequest) -> Result<OrderQuoteResponse, AppError> {
        if req.items.is_empty() {
            return Err(AppError::BadRequest("Order must contain at least one item".into()));
        }
        if req.items.iter().any(|line| line.quantity == 0) {
            return Err(AppError::BadRequest("Quantity must be positive".into()));
        }

        let engine = self.rates().engine();
        if !engine.rates().contains(&req.currency) {
            return Err(AppError::UnsupportedCurrency(
                req.currency.trim().to_ascii_uppercase(),
            ));
        }

        let mut lines = Vec::with_capacity(req.items.len());
        let mut total_usd = Decimal::ZERO;
        for line in req.items {
            let product = self.get_product(line.product_id).await?;
            let line_total_usd = product
                .base_price_usd
                .checked_mul(Decimal::from(line.quantity))
                .ok_or_else(|| AppError::InvalidAmount("Order total is too large".into()))?;
            total_usd = total_usd
                .checked_add(line_total_usd)
                .ok_or_else(|| AppError::InvalidAmount("Order total is too large".into()))?;

            lines.push(OrderLineQuote {
                product_id: product.id,
                name: product.name,
                quantity: line.quantity,
                unit_price_usd: product.base_price_usd,
                line_total_usd,
            });
        }

        let total = engine.convert(total_usd, &req.currency)?;
        Ok(OrderQuoteResponse {
            lines,
            total_usd,
            total,
        })
    }
}
