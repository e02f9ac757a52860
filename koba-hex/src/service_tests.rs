//! PricingService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use koba_types::{
        AmountInput, AppError, ConvertRequest, CreateProductRequest, OrderLine, OrderQuoteRequest,
        Product, ProductId, ProductRepository, RateTable, RepoError, SharedRates,
    };

    use crate::PricingService;

    /// Simple in-memory repository for testing the service layer.
    pub struct MockRepo {
        products: Mutex<HashMap<ProductId, Product>>,
    }

    impl MockRepo {
        pub fn new() -> Self {
            Self {
                products: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl ProductRepository for MockRepo {
        async fn create_product(&self, req: CreateProductRequest) -> Result<Product, RepoError> {
            let mut product = Product::new(req.name, req.base_price_usd)?;
            product.description = req.description;
            product.category = req.category;
            product.image_url = req.image_url;
            product.in_stock = req.in_stock;
            self.products
                .lock()
                .unwrap()
                .insert(product.id, product.clone());
            Ok(product)
        }

        async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepoError> {
            Ok(self.products.lock().unwrap().get(&id).cloned())
        }

        async fn list_products(&self) -> Result<Vec<Product>, RepoError> {
            Ok(self.products.lock().unwrap().values().cloned().collect())
        }

        async fn update_base_price(
            &self,
            id: ProductId,
            price: Decimal,
        ) -> Result<Product, RepoError> {
            let mut products = self.products.lock().unwrap();
            let product = products.get_mut(&id).ok_or(RepoError::NotFound)?;
            product.set_base_price(price)?;
            Ok(product.clone())
        }
    }

    fn service() -> PricingService<MockRepo> {
        PricingService::new(MockRepo::new(), SharedRates::default())
    }

    fn product_request(name: &str, price: Decimal) -> CreateProductRequest {
        CreateProductRequest {
            name: name.to_string(),
            base_price_usd: price,
            description: String::new(),
            category: "serums".to_string(),
            image_url: String::new(),
            in_stock: true,
        }
    }

    fn convert_request(amount: Decimal, from: &str, to: &str) -> ConvertRequest {
        ConvertRequest {
            amount: AmountInput::from(amount),
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    #[tokio::test]
    async fn test_product_prices_cover_every_target() {
        let service = service();
        let product = service
            .create_product(product_request("Glow Serum", dec!(29.99)))
            .await
            .unwrap();

        let prices = service.product_prices(product.id).await.unwrap();

        let codes: Vec<_> = prices
            .prices
            .iter()
            .map(|q| q.currency_code.to_string())
            .collect();
        assert_eq!(codes, ["KES", "UGX", "BIF", "CDF"]);
        assert_eq!(prices.prices[0].amount, dec!(3853.72));
        assert_eq!(prices.prices[0].symbol, "KSh");
        assert_eq!(prices.prices[0].country.as_deref(), Some("Kenya"));
    }

    #[tokio::test]
    async fn test_single_price_is_case_insensitive() {
        let service = service();
        let product = service
            .create_product(product_request("Soap", dec!(100)))
            .await
            .unwrap();

        let quote = service.product_price(product.id, "ugx").await.unwrap();

        assert_eq!(quote.amount, dec!(358234.00));
        assert_eq!(quote.symbol, "USh");
    }

    #[tokio::test]
    async fn test_single_price_in_usd() {
        let service = service();
        let product = service
            .create_product(product_request("Soap", dec!(4.5)))
            .await
            .unwrap();

        let quote = service.product_price(product.id, "USD").await.unwrap();

        assert_eq!(quote.amount, dec!(4.50));
        assert_eq!(quote.rate_used, dec!(1));
    }

    #[tokio::test]
    async fn test_unsupported_currency_is_bad_request() {
        let service = service();
        let product = service
            .create_product(product_request("Soap", dec!(1)))
            .await
            .unwrap();

        let result = service.product_price(product.id, "eur").await;

        assert!(matches!(result, Err(AppError::UnsupportedCurrency(code)) if code == "EUR"));
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let service = service();

        let result = service.product_prices(ProductId::new()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = service.product_price(ProductId::new(), "EUR").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_product_validation() {
        let service = service();

        let result = service.create_product(product_request(" ", dec!(1))).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let result = service
            .create_product(product_request("Soap", dec!(-1)))
            .await;
        assert!(matches!(result, Err(AppError::InvalidAmount(_))));
    }

    #[tokio::test]
    async fn test_update_price_refreshes_quotes() {
        let service = service();
        let product = service
            .create_product(product_request("Oil", dec!(10)))
            .await
            .unwrap();
        service.product_prices(product.id).await.unwrap();
        assert_eq!(service.cache().len(), 1);

        let updated = service
            .update_base_price(product.id, dec!(20))
            .await
            .unwrap();
        assert_eq!(updated.base_price_usd, dec!(20));
        assert!(service.cache().is_empty());

        let quote = service.product_price(product.id, "KES").await.unwrap();
        assert_eq!(quote.amount, dec!(2570));
    }

    #[tokio::test]
    async fn test_update_price_rejects_negative_and_unknown() {
        let service = service();

        let result = service.update_base_price(ProductId::new(), dec!(5)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let product = service
            .create_product(product_request("Oil", dec!(10)))
            .await
            .unwrap();
        let result = service.update_base_price(product.id, dec!(-5)).await;
        assert!(matches!(result, Err(AppError::InvalidAmount(_))));
    }

    #[tokio::test]
    async fn test_rate_refresh_reaches_prices() {
        let rates = SharedRates::default();
        let service = PricingService::new(MockRepo::new(), rates.clone());
        let product = service
            .create_product(product_request("Oil", dec!(2)))
            .await
            .unwrap();
        service.product_prices(product.id).await.unwrap();

        rates.replace(
            RateTable::east_africa()
                .with_rates([("CDF", dec!(2800))])
                .unwrap(),
        );

        let quote = service.product_price(product.id, "CDF").await.unwrap();
        assert_eq!(quote.amount, dec!(5600));
        assert_eq!(service.list_currencies().revision, 1);
    }

    #[tokio::test]
    async fn test_list_products_includes_prices() {
        let service = service();
        service
            .create_product(product_request("A", dec!(1)))
            .await
            .unwrap();
        service
            .create_product(product_request("B", dec!(2)))
            .await
            .unwrap();

        let products = service.list_products().await.unwrap();

        assert_eq!(products.len(), 2);
        assert!(products.iter().all(|p| p.prices.len() == 4));
    }

    #[test]
    fn test_list_currencies() {
        let listing = service().list_currencies();

        assert_eq!(listing.base.as_str(), "USD");
        assert_eq!(listing.revision, 0);
        assert_eq!(listing.currencies.len(), 5);
        assert_eq!(listing.currencies[0].code.as_str(), "USD");
    }

    #[test]
    fn test_currency_for_country() {
        let service = service();

        assert_eq!(service.currency_for_country("Uganda").code.as_str(), "UGX");
        assert_eq!(service.currency_for_country("France").code.as_str(), "USD");
    }

    #[test]
    fn test_convert_defaults_and_cross_rates() {
        let service = service();

        let result = service
            .convert(convert_request(dec!(29.99), "USD", "KES"))
            .unwrap();
        assert_eq!(result.converted.amount, dec!(3853.72));
        assert_eq!(result.converted.symbol, "KSh");
        assert_eq!(result.original.symbol, "$");
        assert_eq!(result.rate, dec!(128.5));

        let result = service
            .convert(convert_request(dec!(128.5), "kes", "usd"))
            .unwrap();
        assert_eq!(result.converted.amount, dec!(1.00));

        let result = service
            .convert(convert_request(dec!(1), "KES", "EUR"))
            .unwrap_err();
        assert_eq!(result.kind(), "unsupported_currency");
    }

    #[test]
    fn test_convert_rejects_bad_amounts() {
        let service = service();

        let req = ConvertRequest {
            amount: AmountInput::Text("lots".into()),
            from: "USD".into(),
            to: "KES".into(),
        };
        assert!(matches!(
            service.convert(req),
            Err(AppError::InvalidAmount(_))
        ));
    }

    #[tokio::test]
    async fn test_quote_order_totals() {
        let service = service();
        let serum = service
            .create_product(product_request("Serum", dec!(29.99)))
            .await
            .unwrap();
        let soap = service
            .create_product(product_request("Soap", dec!(5)))
            .await
            .unwrap();

        let quote = service
            .quote_order(OrderQuoteRequest {
                items: vec![
                    OrderLine {
                        product_id: serum.id,
                        quantity: 1,
                    },
                    OrderLine {
                        product_id: soap.id,
                        quantity: 2,
                    },
                ],
                currency: "kes".into(),
            })
            .await
            .unwrap();

        assert_eq!(quote.lines.len(), 2);
        assert_eq!(quote.lines[1].line_total_usd, dec!(10));
        assert_eq!(quote.total_usd, dec!(39.99));
        assert_eq!(quote.total.amount, dec!(5138.72));
        assert_eq!(quote.total.currency_code.as_str(), "KES");
    }

    #[tokio::test]
    async fn test_quote_order_rejects_bad_carts() {
        let service = service();
        let product = service
            .create_product(product_request("Serum", dec!(1)))
            .await
            .unwrap();

        let empty = OrderQuoteRequest {
            items: vec![],
            currency: "KES".into(),
        };
        assert!(matches!(
            service.quote_order(empty).await,
            Err(AppError::BadRequest(_))
        ));

        let zero = OrderQuoteRequest {
            items: vec![OrderLine {
                product_id: product.id,
                quantity: 0,
            }],
            currency: "KES".into(),
        };
        assert!(matches!(
            service.quote_order(zero).await,
            Err(AppError::BadRequest(_))
        ));

        let euro = OrderQuoteRequest {
            items: vec![OrderLine {
                product_id: product.id,
                quantity: 1,
            }],
            currency: "EUR".into(),
        };
        assert!(matches!(
            service.quote_order(euro).await,
            Err(AppError::UnsupportedCurrency(_))
        ));

        let missing = OrderQuoteRequest {
            items: vec![OrderLine {
                product_id: ProductId::new(),
                quantity: 1,
            }],
            currency: "KES".into(),
        };
        assert!(matches!(
            service.quote_order(missing).await,
            Err(AppError::NotFound(_))
        ));
    }
}
