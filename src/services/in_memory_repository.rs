//! Process-local auction store for tests and runs without a database.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use sea_orm::DbErr;

use super::auction_repository::AuctionRepository;
use crate::models::auction::{Auction, NewAuction};

#[derive(Default)]
pub struct InMemoryAuctionRepository {
    auctions: Mutex<Vec<Auction>>,
    fail_saves: AtomicBool,
}

impl InMemoryAuctionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `save` fail without storing anything.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Vec<Auction> {
        self.auctions.lock().clone()
    }
}

fn newest_first(auctions: &mut [Auction]) {
    auctions.sort_by(|a, b| b.auction_date.cmp(&a.auction_date).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl AuctionRepository for InMemoryAuctionRepository {
    async fn find_by_natural_key(
        &self,
        auction_date: NaiveDate,
        production_month: &str,
    ) -> Result<Option<Auction>, DbErr> {
        Ok(self
            .auctions
            .lock()
            .iter()
            .find(|a| a.auction_date == auction_date && a.production_month == production_month)
            .cloned())
    }

    async fn save(&self, auction: NewAuction) -> Result<Auction, DbErr> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DbErr::Custom("simulated save failure".to_string()));
        }

        let mut auctions = self.auctions.lock();

        let duplicate = auctions.iter().any(|a| {
            a.auction_date == auction.auction_date && a.production_month == auction.production_month
        });
        if duplicate {
            return Err(DbErr::Custom(format!(
                "duplicate auction for {} / {}",
                auction.auction_date, auction.production_month
            )));
        }

        let id = auctions.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let stored = Auction {
            id,
            auction_date: auction.auction_date,
            production_month: auction.production_month,
            reserve_price: auction.reserve_price,
            created_at: auction.created_at,
            regions: auction.regions,
            technologies: auction.technologies,
        };
        auctions.push(stored.clone());

        Ok(stored)
    }

    async fn find_latest(&self) -> Result<Option<Auction>, DbErr> {
        let mut auctions = self.snapshot();
        newest_first(&mut auctions);
        Ok(auctions.into_iter().next())
    }

    async fn find_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Auction>, DbErr> {
        let mut auctions: Vec<Auction> = self
            .snapshot()
            .into_iter()
            .filter(|a| a.auction_date >= start && a.auction_date <= end)
            .collect();
        newest_first(&mut auctions);
        Ok(auctions)
    }

    async fn find_all(&self) -> Result<Vec<Auction>, DbErr> {
        let mut auctions = self.snapshot();
        newest_first(&mut auctions);
        Ok(auctions)
    }

    async fn count(&self) -> Result<u64, DbErr> {
        Ok(self.auctions.lock().len() as u64)
    }
}
