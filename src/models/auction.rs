use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::scrapers::{ScrapedAuction, ScrapedRow};

/// A stored auction with its regional and technology results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auction {
    pub id: i32,
    pub auction_date: NaiveDate,
    pub production_month: String,
    pub reserve_price: Decimal,
    pub created_at: NaiveDateTime,
    pub regions: Vec<AuctionRegion>,
    pub technologies: Vec<AuctionTechnology>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionRegion {
    pub region_name: String,
    pub volume_offered: i64,
    pub volume_allocated: i64,
    pub weighted_avg_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionTechnology {
    pub technology_type: String,
    pub volume_offered: i64,
    pub volume_allocated: i64,
    pub weighted_avg_price: Decimal,
}

impl From<ScrapedRow> for AuctionRegion {
    fn from(row: ScrapedRow) -> Self {
        Self {
            region_name: row.label,
            volume_offered: row.volume_offered,
            volume_allocated: row.volume_allocated,
            weighted_avg_price: row.weighted_avg_price,
        }
    }
}

impl From<ScrapedRow> for AuctionTechnology {
    fn from(row: ScrapedRow) -> Self {
        Self {
            technology_type: row.label,
            volume_offered: row.volume_offered,
            volume_allocated: row.volume_allocated,
            weighted_avg_price: row.weighted_avg_price,
        }
    }
}

/// An auction aggregate that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuction {
    pub auction_date: NaiveDate,
    pub production_month: String,
    pub reserve_price: Decimal,
    pub created_at: NaiveDateTime,
    pub regions: Vec<AuctionRegion>,
    pub technologies: Vec<AuctionTechnology>,
}

impl NewAuction {
    pub fn from_scraped(scraped: ScrapedAuction, created_at: NaiveDateTime) -> Self {
        Self {
            auction_date: scraped.metadata.auction_date,
            production_month: scraped.metadata.production_month,
            reserve_price: scraped.metadata.reserve_price,
            created_at,
            regions: scraped.regions.into_iter().map(AuctionRegion::from).collect(),
            technologies: scraped
                .technologies
                .into_iter()
                .map(AuctionTechnology::from)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty() && self.technologies.is_empty()
    }
}

/// Where a scrape run is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Idle,
    Fetching,
    Locating,
    ExtractingMetadata,
    ExtractingTables,
    CheckingDuplicate,
    Persisting,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Saved { auction_id: i32 },
    Duplicate,
    NothingToSave,
    Failed { stage: RunStage, reason: String },
}

/// Result of one scrape run, returned to manual callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub saved: bool,
    pub region_count: usize,
    pub technology_count: usize,
    pub outcome: RunOutcome,
}

impl RunReport {
    pub fn saved(auction_id: i32, region_count: usize, technology_count: usize) -> Self {
        Self {
            saved: true,
            region_count,
            technology_count,
            outcome: RunOutcome::Saved { auction_id },
        }
    }

    pub fn skipped(outcome: RunOutcome, region_count: usize, technology_count: usize) -> Self {
        Self {
            saved: false,
            region_count,
            technology_count,
            outcome,
        }
    }

    pub fn failed(stage: RunStage, reason: impl Into<String>) -> Self {
        Self::skipped(
            RunOutcome::Failed {
                stage,
                reason: reason.into(),
            },
            0,
            0,
        )
    }
}

/// Query parameters for GET /api/auctions/range
#[derive(Debug, Clone, Deserialize)]
pub struct AuctionRangeQuery {
    pub start_date: String, // YYYY-MM-DD format
    pub end_date: String,   // YYYY-MM-DD format
}

/// Response for GET /api/auctions/stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionStatsResponse {
    pub total_auctions: u64,
    pub latest_auction_date: Option<NaiveDate>,
    pub latest_production_month: Option<String>,
    pub regions_count: Option<usize>,
    pub technologies_count: Option<usize>,
}

/// Response for GET /api/auctions/regions and /api/auctions/technologies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionListResponse {
    pub auctions: Vec<Auction>,
    pub total_auctions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
