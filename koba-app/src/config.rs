//! Configuration loading from environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// JSON rate table replacing the built-in one
    pub rates_file: Option<PathBuf>,
    /// Live rate feed; refresh is disabled when unset
    pub rates_api_url: Option<String>,
    pub rates_refresh: Duration,
    pub price_cache_retries: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let rates_file = optional("RATES_FILE").map(PathBuf::from);
        let rates_api_url = optional("RATES_API_URL");

        let refresh_secs: u64 = env::var("RATES_REFRESH_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()?;
        if refresh_secs == 0 {
            anyhow::bail!("RATES_REFRESH_SECS must be positive");
        }

        let price_cache_retries = env::var("PRICE_CACHE_RETRIES")
            .unwrap_or_else(|_| "2".to_string())
            .parse()?;

        Ok(Self {
            port,
            database_url,
            rates_file,
            rates_api_url,
            rates_refresh: Duration::from_secs(refresh_secs),
            price_cache_retries,
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
