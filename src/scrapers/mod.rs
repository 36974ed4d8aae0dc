pub mod eex;
pub mod fetch;
pub mod metadata;
pub mod parser;
pub mod section;
pub mod tables;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const EEX_FRENCH_AUCTIONS_URL: &str =
    "https://www.eex.com/en/markets/energy-certificates/french-auctions-power";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Used when the page does not state a reserve price.
pub const DEFAULT_RESERVE_PRICE: Decimal = dec!(0.15);

pub const UNKNOWN_PRODUCTION_MONTH: &str = "Unknown";

/// Auction facts read from the results text. Never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionMetadata {
    pub auction_date: NaiveDate,
    pub production_month: String,
    pub reserve_price: Decimal,
}

/// One parsed table row: a region or technology with its auction outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedRow {
    pub label: String,
    pub volume_offered: i64,
    pub volume_allocated: i64,
    pub weighted_avg_price: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Regional,
    Technology,
}

impl TableKind {
    /// Header word that identifies the table and its restated header rows.
    pub fn header_label(self) -> &'static str {
        match self {
            TableKind::Regional => "Region",
            TableKind::Technology => "Technology",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TableKind::Regional => "regional",
            TableKind::Technology => "technology",
        }
    }
}

/// Everything extracted from one results page.
#[derive(Debug, Clone)]
pub struct ScrapedAuction {
    pub metadata: AuctionMetadata,
    pub regions: Vec<ScrapedRow>,
    pub technologies: Vec<ScrapedRow>,
}

impl ScrapedAuction {
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty() && self.technologies.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct ScraperConfig {
    pub source_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub retry_max: u32,
    pub retry_delay_ms: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            source_url: EEX_FRENCH_AUCTIONS_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 75,
            retry_max: 5,
            retry_delay_ms: 30_000,
        }
    }
}
