use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, interval_at};

use crate::error::ScrapeError;
use crate::models::auction::{NewAuction, RunOutcome, RunReport, RunStage};
use crate::scrapers::eex::parse_results_page;
use crate::scrapers::fetch::{FetchClient, Interrupt};
use crate::services::auction_repository::AuctionRepository;

/// Runs the fetch → extract → de-duplicate → persist pipeline.
///
/// Scheduled and manual runs share one instance; a run holds `run_lock` from
/// start to finish so two runs never race on the duplicate check.
pub struct AuctionScraper {
    fetcher: FetchClient,
    repository: Arc<dyn AuctionRepository>,
    source_url: String,
    clock: fn() -> NaiveDateTime,
    run_lock: Mutex<()>,
}

impl AuctionScraper {
    pub fn new(
        fetcher: FetchClient,
        repository: Arc<dyn AuctionRepository>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            repository,
            source_url: source_url.into(),
            clock: || Utc::now().naive_utc(),
            run_lock: Mutex::new(()),
        }
    }

    /// Replace the wall clock used for the auction date and creation time.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Execute one full run. Never fails: errors end up in the report.
    pub async fn run_once(&self) -> RunReport {
        let _guard = self.run_lock.lock().await;
        tracing::info!("Starting auction data scraping from {}", self.source_url);

        let mut stage = RunStage::Idle;
        match self.execute(&mut stage).await {
            Ok(report) => {
                tracing::info!(
                    "Auction scraping completed: saved={}, regions={}, technologies={}",
                    report.saved,
                    report.region_count,
                    report.technology_count
                );
                report
            }
            Err(e) => {
                tracing::error!("Auction scraping failed during {:?}: {}", stage, e);
                RunReport::failed(stage, e.to_string())
            }
        }
    }

    async fn execute(&self, stage: &mut RunStage) -> Result<RunReport, ScrapeError> {
        *stage = RunStage::Fetching;
        let body = self.fetcher.fetch(&self.source_url).await?;

        let now = (self.clock)();
        let scraped = parse_results_page(&body, now.date(), stage)?;
        let auction = NewAuction::from_scraped(scraped, now);
        let region_count = auction.regions.len();
        let technology_count = auction.technologies.len();

        *stage = RunStage::CheckingDuplicate;
        let existing = self
            .repository
            .find_by_natural_key(auction.auction_date, &auction.production_month)
            .await?;

        if let Some(existing) = existing {
            tracing::info!(
                "Auction for {} (production: {}) already exists as #{}, skipping",
                auction.auction_date,
                auction.production_month,
                existing.id
            );
            *stage = RunStage::Done;
            return Ok(RunReport::skipped(RunOutcome::Duplicate, region_count, technology_count));
        }

        if auction.is_empty() {
            tracing::warn!("No auction data found to save");
            *stage = RunStage::Done;
            return Ok(RunReport::skipped(RunOutcome::NothingToSave, 0, 0));
        }

        *stage = RunStage::Persisting;
        let saved = self.repository.save(auction).await?;
        tracing::info!(
            "Saved new auction #{}: {} regions, {} technologies",
            saved.id,
            saved.regions.len(),
            saved.technologies.len()
        );

        *stage = RunStage::Done;
        Ok(RunReport::saved(saved.id, region_count, technology_count))
    }
}

/// Spawn the recurring scrape. The first run happens immediately when
/// `run_on_startup` is set, otherwise after one `every` period.
pub fn start_auction_scraper_job(
    scraper: Arc<AuctionScraper>,
    every: Duration,
    run_on_startup: bool,
    interrupt: Interrupt,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let first = if run_on_startup {
            Instant::now()
        } else {
            Instant::now() + every
        };
        let mut interval = interval_at(first, every);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    tracing::info!("Starting scheduled auction scraper");
                    let report = scraper.run_once().await;
                    if let RunOutcome::Failed { stage, reason } = &report.outcome {
                        tracing::warn!(
                            "Scheduled scrape failed during {:?}: {}; next attempt in {:?}",
                            stage,
                            reason,
                            every
                        );
                    }
                }
                _ = interrupt.fired() => {
                    tracing::info!("Auction scraper job stopping");
                    break;
                }
            }
        }
    })
}
