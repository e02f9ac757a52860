//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use koba_types::{
        CachedPrices, CreateProductRequest, DomainError, PriceCacheStore, PricingEngine,
        ProductId, ProductRepository, RateTable, RepoError,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::SqliteRepo;

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn request(name: &str, price: Decimal) -> CreateProductRequest {
        CreateProductRequest {
            name: name.to_string(),
            base_price_usd: price,
            description: "Shea butter blend".to_string(),
            category: "creams".to_string(),
            image_url: String::new(),
            in_stock: true,
        }
    }

    fn prices_for(id: ProductId, base: Decimal) -> CachedPrices {
        let engine = PricingEngine::new(Arc::new(RateTable::east_africa()));
        CachedPrices::new(id, base, 0, engine.convert_all(base).unwrap())
    }

    #[tokio::test]
    async fn test_create_and_get_product() {
        let repo = setup_repo().await;

        let created = repo
            .create_product(request("Body Cream", dec!(12.99)))
            .await
            .unwrap();
        let fetched = repo.get_product(created.id).await.unwrap().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.base_price_usd, dec!(12.99));
        assert_eq!(fetched.category, "creams");
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let repo = setup_repo().await;

        let result = repo.get_product(ProductId::new()).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_create_product_rejects_negative_price() {
        let repo = setup_repo().await;

        let result = repo.create_product(request("Bad", dec!(-2))).await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::NegativePrice))
        ));
    }

    #[tokio::test]
    async fn test_list_products() {
        let repo = setup_repo().await;

        repo.create_product(request("A", dec!(1))).await.unwrap();
        repo.create_product(request("B", dec!(2))).await.unwrap();

        let products = repo.list_products().await.unwrap();

        assert_eq!(products.len(), 2);
    }

    #[tokio::test]
    async fn test_update_base_price() {
        let repo = setup_repo().await;
        let product = repo.create_product(request("Oil", dec!(8))).await.unwrap();

        let updated = repo.update_base_price(product.id, dec!(9.5)).await.unwrap();
        assert_eq!(updated.base_price_usd, dec!(9.5));
        assert!(updated.updated_at >= product.updated_at);

        let fetched = repo.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(fetched.base_price_usd, dec!(9.5));
    }

    #[tokio::test]
    async fn test_update_base_price_unknown_product() {
        let repo = setup_repo().await;

        let result = repo.update_base_price(ProductId::new(), dec!(1)).await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::ProductNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_price_records_round_trip() {
        let repo = setup_repo().await;
        let product = repo
            .create_product(request("Serum", dec!(29.99)))
            .await
            .unwrap();

        let prices = prices_for(product.id, dec!(29.99));
        repo.save_prices(&prices).await.unwrap();

        let loaded = repo.load_prices(product.id).await.unwrap().unwrap();
        assert_eq!(loaded.base_price_usd, dec!(29.99));
        assert_eq!(loaded.quotes, prices.quotes);
        assert!(loaded.is_fresh(dec!(29.99), &RateTable::east_africa()));
    }

    #[tokio::test]
    async fn test_save_prices_replaces_record() {
        let repo = setup_repo().await;
        let product = repo.create_product(request("Soap", dec!(3))).await.unwrap();

        repo.save_prices(&prices_for(product.id, dec!(3)))
            .await
            .unwrap();
        repo.save_prices(&prices_for(product.id, dec!(4)))
            .await
            .unwrap();

        let loaded = repo.load_prices(product.id).await.unwrap().unwrap();
        assert_eq!(loaded.base_price_usd, dec!(4));
        assert_eq!(loaded.quotes[0].amount, dec!(514));
    }

    #[tokio::test]
    async fn test_remove_prices() {
        let repo = setup_repo().await;
        let product = repo.create_product(request("Soap", dec!(3))).await.unwrap();
        repo.save_prices(&prices_for(product.id, dec!(3)))
            .await
            .unwrap();

        repo.remove_prices(product.id).await.unwrap();

        assert!(repo.load_prices(product.id).await.unwrap().is_none());
        // Removing twice is fine
        repo.remove_prices(product.id).await.unwrap();
    }
}
