//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use koba_types::{
    AppError, ConvertRequest, CreateProductRequest, OrderQuoteRequest, PriceQuery, ProductId,
    ProductRepository, UpdatePriceRequest,
};

use crate::PricingService;

/// Application state shared across handlers.
pub struct AppState<R: ProductRepository> {
    pub service: PricingService<R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(AppError::BadRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::UnsupportedCurrency(_)
            | AppError::InvalidAmount(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Backend detail stays in the logs
        let message = match &self.0 {
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "error": message,
            "kind": self.0.kind(),
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

fn parse_product_id(raw: &str) -> Result<ProductId, ApiError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid product ID".into()).into())
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Currencies
// ─────────────────────────────────────────────────────────────────────────────

/// List the currencies of the current rate table.
#[tracing::instrument(skip(state))]
pub async fn list_currencies<R: ProductRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> impl IntoResponse {
    Json(state.service.list_currencies())
}

/// Currency used in a country.
#[tracing::instrument(skip(state))]
pub async fn currency_for_country<R: ProductRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(country): Path<String>,
) -> impl IntoResponse {
    Json(state.service.currency_for_country(&country))
}

/// Convert an amount between two currencies.
#[tracing::instrument(skip(state, payload))]
pub async fn convert<R: ProductRepository>(
    State(state): State<Arc<AppState<R>>>,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let conversion = state.service.convert(req)?;
    Ok(Json(conversion))
}

// ─────────────────────────────────────────────────────────────────────────────
// Products
// ─────────────────────────────────────────────────────────────────────────────

/// List products with their regional prices.
#[tracing::instrument(skip(state))]
pub async fn list_products<R: ProductRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state.service.list_products().await?;
    Ok(Json(products))
}

#[tracing::instrument(skip(state, payload))]
pub async fn create_product<R: ProductRepository>(
    State(state): State<Arc<AppState<R>>>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let product = state.service.create_product(req).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// All prices of a product, or one price with `?currency=`.
#[tracing::instrument(skip(state), fields(product_id = %id))]
pub async fn product_prices<R: ProductRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Query(query): Query<PriceQuery>,
) -> Result<Response, ApiError> {
    let product_id = parse_product_id(&id)?;

    match query.currency {
        Some(currency) => {
            let quote = state.service.product_price(product_id, &currency).await?;
            Ok(Json(quote).into_response())
        }
        None => {
            let prices = state.service.product_prices(product_id).await?;
            Ok(Json(prices).into_response())
        }
    }
}

/// Change a product's USD base price.
#[tracing::instrument(skip(state, payload), fields(product_id = %id))]
pub async fn update_price<R: ProductRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePriceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let product_id = parse_product_id(&id)?;
    let Json(req) = payload?;

    let product = state
        .service
        .update_base_price(product_id, req.base_price_usd)
        .await?;
    Ok(Json(product))
}

// ─────────────────────────────────────────────────────────────────────────────
// Orders
// ─────────────────────────────────────────────────────────────────────────────

/// Price a cart in one currency.
#[tracing::instrument(skip(state, payload))]
pub async fn quote_order<R: ProductRepository>(
    State(state): State<Arc<AppState<R>>>,
    payload: Result<Json<OrderQuoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let quote = state.service.quote_order(req).await?;
    Ok(Json(quote))
}
