//! # Koba Pricing Server
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Load the rate table and start the optional rate refresher
//! - Initialize the repository adapter and price cache
//! - Create the pricing service
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use koba_hex::{PriceCache, PricingService, RateRefresher, RetryPolicy, inbound::HttpServer};
use koba_repo::{ExchangeRateApi, build_repo};
use koba_types::{PriceCacheStore, RateTable, SharedRates};

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("koba-pricing"), provider))
}

/// Loads the configured rate table, or the built-in East Africa table.
fn load_rate_table(config: &config::Config) -> anyhow::Result<RateTable> {
    match &config.rates_file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
            let table = RateTable::from_json(&json)?;
            tracing::info!("Loaded {} currencies from {}", table.len(), path.display());
            Ok(table)
        }
        None => Ok(RateTable::east_africa()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize OpenTelemetry tracing
    let (otel_tracer, otel_provider) = init_tracer()?;
    let telemetry = tracing_opentelemetry::layer().with_tracer(otel_tracer);

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,koba_app=debug,koba_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting pricing server on port {}", config.port);
    tracing::info!("Using database: {}", config.database_url);

    // Rate table snapshot shared by the cache, the service and the refresher
    let rates = SharedRates::new(load_rate_table(&config)?);

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;

    let store: Arc<dyn PriceCacheStore> = Arc::new(repo.clone());
    let cache = PriceCache::new(rates.clone())
        .with_store(store)
        .with_retry(RetryPolicy {
            attempts: config.price_cache_retries,
            ..RetryPolicy::default()
        });

    if let Some(url) = &config.rates_api_url {
        let refresher = RateRefresher::new(
            rates.clone(),
            Arc::new(ExchangeRateApi::new(url.clone())?),
            config.rates_refresh,
        );
        tokio::spawn(refresher.run());
    } else {
        tracing::info!("RATES_API_URL not set, serving the static rate table");
    }

    // Create the pricing service
    let service = PricingService::with_cache(repo, cache);

    // Create and run the HTTP server
    let server = HttpServer::new(service);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    let _ = otel_provider.shutdown();
    Ok(())
}
