use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::scrapers::ScraperConfig;

/// Process configuration, read from the environment (and `.env` via dotenvy).
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub scraper: ScraperConfig,
    pub scrape_interval: Duration,
    pub run_on_startup: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ScraperConfig::default();

        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let scraper = ScraperConfig {
            source_url: lookup("AUCTION_SOURCE_URL").unwrap_or(defaults.source_url),
            user_agent: lookup("SCRAPER_USER_AGENT").unwrap_or(defaults.user_agent),
            timeout_secs: parse_or(&lookup, "SCRAPER_TIMEOUT_SECS", defaults.timeout_secs)?,
            retry_max: parse_or(&lookup, "SCRAPER_RETRY_MAX", defaults.retry_max)?,
            retry_delay_ms: retry_delay_ms(&lookup, defaults.retry_delay_ms)?,
        };

        if scraper.retry_max == 0 {
            return Err(ConfigError::Invalid {
                key: "SCRAPER_RETRY_MAX",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            database_url,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            scraper,
            scrape_interval: Duration::from_secs(parse_or(&lookup, "SCRAPER_INTERVAL_SECS", 86_400)?),
            run_on_startup: parse_or(&lookup, "SCRAPER_RUN_ON_STARTUP", true)?,
        })
    }
}

fn retry_delay_ms(
    lookup: &impl Fn(&str) -> Option<String>,
    default_ms: u64,
) -> Result<u64, ConfigError> {
    const KEY: &str = "SCRAPER_RETRY_DELAY_SECS";
    let secs: u64 = parse_or(lookup, KEY, default_ms / 1000)?;

    secs.checked_mul(1000).ok_or_else(|| ConfigError::Invalid {
        key: KEY,
        value: secs.to_string(),
    })
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
