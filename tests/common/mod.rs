#![allow(dead_code)]

use std::collections::VecDeque;
use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use auction_scraper::{
    AppState,
    jobs::auction_scraper::AuctionScraper,
    scrapers::{
        ScraperConfig,
        fetch::{FetchClient, Interrupt, PageSource},
    },
    services::in_memory_repository::InMemoryAuctionRepository,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use parking_lot::Mutex;
use sea_orm::{Database, DatabaseConnection, DbErr};

pub const RESULTS_PAGE: &str = include_str!("../fixtures/eex_results.html");

pub fn fixed_now() -> NaiveDateTime {
    NaiveDateTime::new(
        NaiveDate::from_ymd_opt(2025, 3, 18).unwrap(),
        NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
    )
}

/// Serves scripted responses in order; the last one repeats.
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<u32>,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<String, String>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(0),
        })
    }

    pub fn page(body: &str) -> Arc<Self> {
        Self::new(vec![Ok(body.to_string())])
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock()
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn get(&self, _url: &str) -> Result<String, String> {
        *self.calls.lock() += 1;
        let mut responses = self.responses.lock();
        if responses.len() > 1 {
            responses.pop_front().unwrap()
        } else {
            responses.front().cloned().unwrap()
        }
    }
}

pub struct Harness {
    pub source: Arc<ScriptedSource>,
    pub repository: Arc<InMemoryAuctionRepository>,
    pub scraper: Arc<AuctionScraper>,
}

impl Harness {
    pub fn new(source: Arc<ScriptedSource>) -> Self {
        let fetcher = FetchClient::new(source.clone(), &ScraperConfig::default(), Interrupt::never());
        let repository = Arc::new(InMemoryAuctionRepository::new());
        let scraper = Arc::new(
            AuctionScraper::new(fetcher, repository.clone(), "http://eex.test/results")
                .with_clock(fixed_now),
        );

        Self {
            source,
            repository,
            scraper,
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            repository: self.repository.clone(),
            scraper: self.scraper.clone(),
        }
    }
}

/// PostgreSQL connection for tests that need a real database.
/// Returns `None` when TEST_DATABASE_URL is not set.
pub async fn setup_test_db() -> Option<Result<DatabaseConnection, DbErr>> {
    let database_url = env::var("TEST_DATABASE_URL").ok()?;
    Some(Database::connect(&database_url).await)
}
