//! # Koba Client SDK
//!
//! A typed Rust client for the Koba pricing API.

use koba_types::{
    AmountInput, ConvertRequest, ConvertResponse, CreateProductRequest, CurrencyInfo,
    CurrencyListResponse, OrderLine, OrderQuoteRequest, OrderQuoteResponse, PriceQuote,
    PricedProduct, Product, ProductId, ProductPricesResponse, UpdatePriceRequest,
};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        /// Stable error kind, e.g. `unsupported_currency`
        kind: Option<String>,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Koba pricing API client.
pub struct PricingClient {
    base_url: String,
    http: Client,
}

impl PricingClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Lists the currencies of the current rate table.
    pub async fn currencies(&self) -> Result<CurrencyListResponse, ClientError> {
        self.get("/api/currencies").await
    }

    /// Currency used in a country.
    pub async fn currency_for_country(&self, country: &str) -> Result<CurrencyInfo, ClientError> {
        let url = self.url_with_segments(&["api", "currencies", "country", country])?;
        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    /// Lists products with their regional prices.
    pub async fn products(&self) -> Result<Vec<PricedProduct>, ClientError> {
        self.get("/api/products").await
    }

    /// Creates a product.
    pub async fn create_product(&self, req: &CreateProductRequest) -> Result<Product, ClientError> {
        self.post("/api/products", req).await
    }

    /// All regional prices of a product.
    pub async fn prices(&self, id: ProductId) -> Result<ProductPricesResponse, ClientError> {
        self.get(&format!("/api/products/{}/prices", id)).await
    }

    /// The price of a product in one currency.
    pub async fn price(&self, id: ProductId, currency: &str) -> Result<PriceQuote, ClientError> {
        let resp = self
            .http
            .get(format!("{}/api/products/{}/prices", self.base_url, id))
            .query(&[("currency", currency)])
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Changes a product's USD base price.
    pub async fn update_price(
        &self,
        id: ProductId,
        base_price_usd: Decimal,
    ) -> Result<Product, ClientError> {
        let resp = self
            .http
            .put(format!("{}/api/products/{}/price", self.base_url, id))
            .json(&UpdatePriceRequest { base_price_usd })
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Converts an amount between two currencies.
    pub async fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> Result<ConvertResponse, ClientError> {
        let req = ConvertRequest {
            amount: AmountInput::from(amount),
            from: from.to_string(),
            to: to.to_string(),
        };
        self.post("/api/convert", &req).await
    }

    /// Prices a cart in one currency.
    pub async fn quote_order(
        &self,
        items: Vec<OrderLine>,
        currency: &str,
    ) -> Result<OrderQuoteResponse, ClientError> {
        let req = OrderQuoteRequest {
            items,
            currency: currency.to_string(),
        };
        self.post("/api/quotes/order", &req).await
    }

    /// Appends percent-encoded path segments to the base URL.
    fn url_with_segments(&self, segments: &[&str]) -> Result<reqwest::Url, ClientError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let parsed = serde_json::from_str::<serde_json::Value>(&body).ok();
            let field = |name: &str| {
                parsed
                    .as_ref()
                    .and_then(|v| v.get(name))
                    .and_then(|v| v.as_str())
                    .map(String::from)
            };
            Err(ClientError::Api {
                status: status.as_u16(),
                kind: field("kind"),
                message: field("error").unwrap_or(body),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use koba_hex::{PricingService, inbound::HttpServer};
    use koba_repo::SqliteRepo;
    use koba_types::SharedRates;
    use rust_decimal_macros::dec;

    async fn spawn_server() -> PricingClient {
        let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
        let service = PricingService::new(repo, SharedRates::default());
        let router = HttpServer::new(service).router();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        PricingClient::new(format!("http://{}/", addr))
    }

    fn product(name: &str, price: Decimal) -> CreateProductRequest {
        CreateProductRequest {
            name: name.to_string(),
            base_price_usd: price,
            description: String::new(),
            category: "oils".to_string(),
            image_url: String::new(),
            in_stock: true,
        }
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = PricingClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_path_segments_are_encoded() {
        let client = PricingClient::new("http://localhost:3000");
        let url = client
            .url_with_segments(&["api", "currencies", "country", "a/b?c#d"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/currencies/country/a%2Fb%3Fc%23d"
        );
    }

    #[tokio::test]
    async fn test_catalogue_round_trip() {
        let client = spawn_server().await;
        assert!(client.health().await.unwrap());

        let created = client
            .create_product(&product("Argan Oil", dec!(15)))
            .await
            .unwrap();
        let prices = client.prices(created.id).await.unwrap();
        assert_eq!(prices.prices.len(), 4);

        let quote = client.price(created.id, "cdf").await.unwrap();
        assert_eq!(quote.amount, dec!(40500));

        let updated = client.update_price(created.id, dec!(16)).await.unwrap();
        assert_eq!(updated.base_price_usd, dec!(16));

        let listed = client.products().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].prices[0].amount, dec!(2056));
    }

    #[tokio::test]
    async fn test_currency_endpoints() {
        let client = spawn_server().await;

        let listing = client.currencies().await.unwrap();
        assert_eq!(listing.currencies.len(), 5);

        let info = client.currency_for_country("Kenya").await.unwrap();
        assert_eq!(info.code.as_str(), "KES");

        let info = client.currency_for_country("DRC Congo").await.unwrap();
        assert_eq!(info.code.as_str(), "CDF");

        let info = client.currency_for_country("Congo/Zaire?").await.unwrap();
        assert_eq!(info.code.as_str(), "USD");

        let conversion = client.convert(dec!(29.99), "USD", "KES").await.unwrap();
        assert_eq!(conversion.converted.amount, dec!(3853.72));
    }

    #[tokio::test]
    async fn test_api_errors_carry_kind() {
        let client = spawn_server().await;

        let err = client.convert(dec!(1), "USD", "EUR").await.unwrap_err();
        match err {
            ClientError::Api { status, kind, .. } => {
                assert_eq!(status, 400);
                assert_eq!(kind.as_deref(), Some("unsupported_currency"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_order_quote() {
        let client = spawn_server().await;
        let created = client
            .create_product(&product("Shea Butter", dec!(7.5)))
            .await
            .unwrap();

        let quote = client
            .quote_order(
                vec![OrderLine {
                    product_id: created.id,
                    quantity: 4,
                }],
                "BIF",
            )
            .await
            .unwrap();

        assert_eq!(quote.total_usd, dec!(30));
        assert_eq!(quote.total.amount, dec!(85500));
    }
}
