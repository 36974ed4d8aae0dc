// src/lib.rs

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use jobs::auction_scraper::AuctionScraper;
use services::auction_repository::AuctionRepository;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn AuctionRepository>,
    pub scraper: Arc<AuctionScraper>,
}

pub mod entities {
    pub mod prelude;
    pub mod auctions;
    pub mod auction_regions;
    pub mod auction_technologies;
}

pub mod services {
    pub mod auction_repository;
    pub mod in_memory_repository;
}

pub mod config;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod scrapers;

/// Read API plus the manual scrape trigger.
pub fn build_router(state: AppState) -> Router {
    use handlers::auction;

    Router::new()
        .route("/api/auctions", get(auction::get_all_auctions))
        .route("/api/auctions/latest", get(auction::get_latest_auction))
        .route("/api/auctions/range", get(auction::get_auctions_by_date_range))
        .route("/api/auctions/regions", get(auction::get_regional_data))
        .route("/api/auctions/technologies", get(auction::get_technology_data))
        .route("/api/auctions/stats", get(auction::get_auction_stats))
        .route("/api/auctions/health", get(auction::health))
        .route("/api/auctions/scrape", post(auction::trigger_scrape))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
