//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use koba_types::domain::{CachedPrices, Product, ProductId};
use koba_types::dto::{
    ConvertRequest, ConvertResponse, CreateProductRequest, CurrencyListResponse, DisplayAmount,
    OrderLine, OrderLineQuote, OrderQuoteRequest, OrderQuoteResponse, PriceQuery, PricedProduct,
    ProductPricesResponse, UpdatePriceRequest,
};
use koba_types::{CurrencyCode, CurrencyInfo, PriceQuote};
use utoipa::OpenApi;

// Path stubs for documentation; the real handlers live in `inbound::handlers`.

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// List the currencies of the current rate table
#[utoipa::path(
    get,
    path = "/api/currencies",
    tag = "currencies",
    responses(
        (status = 200, description = "Rate table", body = CurrencyListResponse)
    )
)]
async fn list_currencies() {}

/// Currency used in a country (USD when unknown)
#[utoipa::path(
    get,
    path = "/api/currencies/country/{country}",
    tag = "currencies",
    params(
        ("country" = String, Path, description = "Country name, e.g. Kenya")
    ),
    responses(
        (status = 200, description = "Currency entry", body = CurrencyInfo)
    )
)]
async fn currency_for_country() {}

/// Convert an amount between two currencies
#[utoipa::path(
    post,
    path = "/api/convert",
    tag = "currencies",
    request_body = ConvertRequest,
    responses(
        (status = 200, description = "Conversion result", body = ConvertResponse),
        (status = 400, description = "Unsupported currency or invalid amount")
    )
)]
async fn convert() {}

/// List products with their regional prices
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "products",
    responses(
        (status = 200, description = "Products with prices", body = Vec<PricedProduct>)
    )
)]
async fn list_products() {}

/// Create a product
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid request")
    )
)]
async fn create_product() {}

/// Regional prices of a product
#[utoipa::path(
    get,
    path = "/api/products/{id}/prices",
    tag = "products",
    params(
        ("id" = ProductId, Path, description = "Product ID (UUID)"),
        PriceQuery
    ),
    responses(
        (status = 200, description = "All prices, or a single PriceQuote when `currency` is given", body = ProductPricesResponse),
        (status = 400, description = "Unsupported currency"),
        (status = 404, description = "Product not found")
    )
)]
async fn product_prices() {}

/// Change a product's USD base price
#[utoipa::path(
    put,
    path = "/api/products/{id}/price",
    tag = "products",
    params(
        ("id" = ProductId, Path, description = "Product ID (UUID)")
    ),
    request_body = UpdatePriceRequest,
    responses(
        (status = 200, description = "Updated product", body = Product),
        (status = 400, description = "Invalid amount"),
        (status = 404, description = "Product not found")
    )
)]
async fn update_price() {}

/// Price a cart in one currency
#[utoipa::path(
    post,
    path = "/api/quotes/order",
    tag = "orders",
    request_body = OrderQuoteRequest,
    responses(
        (status = 200, description = "Order totals", body = OrderQuoteResponse),
        (status = 400, description = "Empty order, zero quantity or unsupported currency"),
        (status = 404, description = "Product not found")
    )
)]
async fn quote_order() {}

/// OpenAPI documentation for the pricing API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Koba Pricing API",
        version = "1.0.0",
        description = "Multi-currency pricing for an East African storefront. Products carry a USD base price; regional prices are derived from the current rate table.",
        license(name = "MIT"),
    ),
    paths(
        health,
        list_currencies,
        currency_for_country,
        convert,
        list_products,
        create_product,
        product_prices,
        update_price,
        quote_order,
    ),
    components(
        schemas(
            CurrencyCode,
            CurrencyInfo,
            CurrencyListResponse,
            PriceQuote,
            ConvertRequest,
            ConvertResponse,
            DisplayAmount,
            Product,
            ProductId,
            PricedProduct,
            ProductPricesResponse,
            CreateProductRequest,
            UpdatePriceRequest,
            CachedPrices,
            OrderLine,
            OrderQuoteRequest,
            OrderLineQuote,
            OrderQuoteResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "currencies", description = "Rate table and conversions"),
        (name = "products", description = "Catalogue and regional prices"),
        (name = "orders", description = "Cart totals"),
    )
)]
pub struct ApiDoc;
