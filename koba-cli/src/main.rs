//! Koba CLI
//!
//! Command-line interface for the Koba pricing API.

use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use koba_client::PricingClient;
use koba_types::{CreateProductRequest, OrderLine, ProductId};

#[derive(Parser)]
#[command(name = "koba")]
#[command(author, version, about = "Koba pricing API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the pricing API
    #[arg(long, env = "KOBA_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported currencies and their rates
    Currencies,
    /// Show the currency used in a country
    Country {
        /// Country name, e.g. Kenya
        name: String,
    },
    /// Product operations
    Product {
        #[command(subcommand)]
        action: ProductCommands,
    },
    /// Convert an amount between currencies
    Convert {
        /// Amount to convert
        amount: String,
        #[arg(long, default_value = "USD")]
        from: String,
        #[arg(long, default_value = "KES")]
        to: String,
    },
    /// Price a cart in one currency
    Order {
        /// Cart lines as PRODUCT_ID:QUANTITY
        #[arg(required = true)]
        items: Vec<String>,
        #[arg(long, default_value = "KES")]
        currency: String,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum ProductCommands {
    /// Create a new product
    Create {
        /// Product name
        name: String,
        /// Base price in USD
        #[arg(long)]
        price: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Mark the product as out of stock
        #[arg(long)]
        out_of_stock: bool,
    },
    /// List products with their regional prices
    List,
    /// Show all regional prices of a product
    Prices {
        /// Product ID (UUID)
        id: String,
    },
    /// Show the price of a product in one currency
    Price {
        /// Product ID (UUID)
        id: String,
        #[arg(long)]
        currency: String,
    },
    /// Change a product's USD base price
    SetPrice {
        /// Product ID (UUID)
        id: String,
        /// New base price in USD
        price: String,
    },
}

fn parse_product_id(s: &str) -> Result<ProductId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid product ID: {}", s))
}

fn parse_price(s: &str) -> Result<Decimal> {
    Decimal::from_str(s.trim()).map_err(|_| anyhow::anyhow!("Invalid amount: {}", s))
}

fn parse_order_line(s: &str) -> Result<OrderLine> {
    let (id, quantity) = s.split_once(':').unwrap_or((s, "1"));
    let quantity = quantity
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid quantity in {}", s))?;
    Ok(OrderLine {
        product_id: parse_product_id(id)?,
        quantity,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = PricingClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Currencies => {
            let listing = client.currencies().await?;
            println!("Rate table revision {}", listing.revision);
            for info in &listing.currencies {
                println!(
                    "{:<4} {:<6} {:>12} {:<18} {}",
                    info.code,
                    info.display_symbol(),
                    info.rate,
                    info.name,
                    info.country.as_deref().unwrap_or("-"),
                );
            }
        }

        Commands::Country { name } => {
            let info = client.currency_for_country(&name).await?;
            print_json(&info)?;
        }

        Commands::Product { action } => match action {
            ProductCommands::Create {
                name,
                price,
                category,
                description,
                out_of_stock,
            } => {
                let req = CreateProductRequest {
                    name,
                    base_price_usd: parse_price(&price)?,
                    description,
                    category,
                    image_url: String::new(),
                    in_stock: !out_of_stock,
                };
                let product = client.create_product(&req).await?;
                print_json(&product)?;
            }
            ProductCommands::List => {
                let products = client.products().await?;
                print_json(&products)?;
            }
            ProductCommands::Prices { id } => {
                let prices = client.prices(parse_product_id(&id)?).await?;
                println!("{} (${:.2})", prices.product_name, prices.base_price_usd);
                for quote in &prices.prices {
                    println!(
                        "  {} {:.2} {}",
                        quote.symbol, quote.amount, quote.currency_code
                    );
                }
            }
            ProductCommands::Price { id, currency } => {
                let quote = client.price(parse_product_id(&id)?, &currency).await?;
                print_json(&quote)?;
            }
            ProductCommands::SetPrice { id, price } => {
                let product = client
                    .update_price(parse_product_id(&id)?, parse_price(&price)?)
                    .await?;
                print_json(&product)?;
            }
        },

        Commands::Convert { amount, from, to } => {
            let result = client.convert(parse_price(&amount)?, &from, &to).await?;
            println!(
                "{} {:.2} = {} {:.2} (rate {})",
                result.original.symbol,
                result.original.amount,
                result.converted.symbol,
                result.converted.amount,
                result.rate
            );
        }

        Commands::Order { items, currency } => {
            let lines = items
                .iter()
                .map(String::as_str)
                .map(parse_order_line)
                .collect::<Result<Vec<_>>>()?;
            let quote = client.quote_order(lines, &currency).await?;
            print_json(&quote)?;
        }
    }

    Ok(())
}
