//! Client example walking through the pricing flows against a running server.
//!
//! Run with: cargo run -p koba-app --example client_example --no-default-features --features sqlite

use koba_client::{ClientError, PricingClient};
use koba_hex::{PricingService, inbound::HttpServer};
use koba_repo::build_repo;
use koba_types::{CreateProductRequest, OrderLine, SharedRates};
use rust_decimal_macros::dec;
use std::net::SocketAddr;
use tempfile::tempdir;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Bind an available port and hand the listener to the server
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;

    // Use a temp file-backed SQLite DB
    let tmp = tempdir()?;
    let db_path = tmp.path().join("koba.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    println!("🚀 Starting server on {addr}...");
    println!("   Database: {db_url}");

    let repo = build_repo(&db_url).await?;
    let service = PricingService::new(repo, SharedRates::default());
    let router = HttpServer::new(service).router();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router.into_make_service()).await {
            eprintln!("server error: {e}");
        }
    });

    let client = PricingClient::new(format!("http://{addr}"));

    let health = client.health().await?;
    println!("✅ Server health: {health}");

    let listing = client.currencies().await?;
    println!("\n💱 Rates (revision {}):", listing.revision);
    for info in &listing.currencies {
        println!("   - {} {:>10} {}", info.code, info.rate, info.name);
    }

    let serum = client
        .create_product(&CreateProductRequest {
            name: "Glow Serum".to_string(),
            base_price_usd: dec!(29.99),
            description: "Vitamin C face serum".to_string(),
            category: "skincare".to_string(),
            image_url: String::new(),
            in_stock: true,
        })
        .await?;
    println!("\n✅ Created product: {} (id={})", serum.name, serum.id);

    let prices = client.prices(serum.id).await?;
    println!("   Regional prices:");
    for quote in &prices.prices {
        println!("   - {} {:.2} ({})", quote.symbol, quote.amount, quote.currency_code);
    }

    let updated = client.update_price(serum.id, dec!(24.99)).await?;
    let kes = client.price(serum.id, "KES").await?;
    println!(
        "✅ Repriced to ${:.2}, now {} {:.2} in Kenya",
        updated.base_price_usd, kes.symbol, kes.amount
    );

    let conversion = client.convert(dec!(50000), "UGX", "KES").await?;
    println!(
        "\n✅ {} {:.2} = {} {:.2}",
        conversion.original.symbol,
        conversion.original.amount,
        conversion.converted.symbol,
        conversion.converted.amount
    );

    match client.convert(dec!(10), "USD", "EUR").await {
        Err(ClientError::Api { kind, message, .. }) => {
            println!("✅ EUR rejected ({}): {message}", kind.unwrap_or_default())
        }
        other => println!("⚠️  Unexpected response: {other:?}"),
    }

    let order = client
        .quote_order(
            vec![OrderLine {
                product_id: serum.id,
                quantity: 3,
            }],
            "CDF",
        )
        .await?;
    println!(
        "\n🧾 Order of 3 serums: ${:.2} = {} {:.2}",
        order.total_usd, order.total.symbol, order.total.amount
    );

    println!("\n🎉 Example completed successfully!");

    Ok(())
}
