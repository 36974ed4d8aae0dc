//! Storage of auction aggregates.
//!
//! The scraper only depends on [`AuctionRepository`]; PostgreSQL through
//! SeaORM is the production implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{auction_regions, auction_technologies, auctions, prelude::*};
use crate::models::auction::{Auction, AuctionRegion, AuctionTechnology, NewAuction};

#[async_trait]
pub trait AuctionRepository: Send + Sync {
    /// Lookup by the natural key used for de-duplication.
    async fn find_by_natural_key(
        &self,
        auction_date: NaiveDate,
        production_month: &str,
    ) -> Result<Option<Auction>, DbErr>;

    /// Store the auction and all of its children as one unit.
    async fn save(&self, auction: NewAuction) -> Result<Auction, DbErr>;

    async fn find_latest(&self) -> Result<Option<Auction>, DbErr>;

    /// Auctions dated within `[start, end]`, newest first.
    async fn find_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Auction>, DbErr>;

    /// Every auction, newest first.
    async fn find_all(&self) -> Result<Vec<Auction>, DbErr>;

    async fn count(&self) -> Result<u64, DbErr>;
}

pub struct SeaOrmAuctionRepository {
    db: DatabaseConnection,
}

impl SeaOrmAuctionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Attach region and technology rows to each auction, keeping input order.
    async fn with_children(&self, parents: Vec<auctions::Model>) -> Result<Vec<Auction>, DbErr> {
        if parents.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = parents.iter().map(|p| p.id).collect();

        let mut regions: HashMap<i32, Vec<AuctionRegion>> = HashMap::new();
        for row in AuctionRegions::find()
            .filter(auction_regions::Column::AuctionId.is_in(ids.clone()))
            .order_by(auction_regions::Column::Id, Order::Asc)
            .all(&self.db)
            .await?
        {
            regions.entry(row.auction_id).or_default().push(row.into());
        }

        let mut technologies: HashMap<i32, Vec<AuctionTechnology>> = HashMap::new();
        for row in AuctionTechnologies::find()
            .filter(auction_technologies::Column::AuctionId.is_in(ids))
            .order_by(auction_technologies::Column::Id, Order::Asc)
            .all(&self.db)
            .await?
        {
            technologies.entry(row.auction_id).or_default().push(row.into());
        }

        Ok(parents
            .into_iter()
            .map(|parent| {
                let regions = regions.remove(&parent.id).unwrap_or_default();
                let technologies = technologies.remove(&parent.id).unwrap_or_default();
                aggregate(parent, regions, technologies)
            })
            .collect())
    }
}

#[async_trait]
impl AuctionRepository for SeaOrmAuctionRepository {
    async fn find_by_natural_key(
        &self,
        auction_date: NaiveDate,
        production_month: &str,
    ) -> Result<Option<Auction>, DbErr> {
        let found = Auctions::find()
            .filter(auctions::Column::AuctionDate.eq(auction_date))
            .filter(auctions::Column::ProductionMonth.eq(production_month))
            .one(&self.db)
            .await?;

        match found {
            Some(model) => Ok(self.with_children(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn save(&self, auction: NewAuction) -> Result<Auction, DbErr> {
        // Dropping the transaction without commit rolls everything back
        let txn = self.db.begin().await?;

        let parent = auctions::ActiveModel {
            auction_date: Set(auction.auction_date),
            production_month: Set(auction.production_month.clone()),
            reserve_price: Set(auction.reserve_price),
            created_at: Set(auction.created_at),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for region in &auction.regions {
            auction_regions::ActiveModel {
                auction_id: Set(parent.id),
                region_name: Set(region.region_name.clone()),
                volume_offered: Set(region.volume_offered),
                volume_allocated: Set(region.volume_allocated),
                weighted_avg_price: Set(region.weighted_avg_price),
                created_at: Set(auction.created_at),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        for technology in &auction.technologies {
            auction_technologies::ActiveModel {
                auction_id: Set(parent.id),
                technology_type: Set(technology.technology_type.clone()),
                volume_offered: Set(technology.volume_offered),
                volume_allocated: Set(technology.volume_allocated),
                weighted_avg_price: Set(technology.weighted_avg_price),
                created_at: Set(auction.created_at),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        tracing::debug!(
            "Stored auction {} ({} regions, {} technologies)",
            parent.id,
            auction.regions.len(),
            auction.technologies.len()
        );

        Ok(aggregate(parent, auction.regions, auction.technologies))
    }

    async fn find_latest(&self) -> Result<Option<Auction>, DbErr> {
        let latest = Auctions::find()
            .order_by(auctions::Column::AuctionDate, Order::Desc)
            .order_by(auctions::Column::Id, Order::Desc)
            .one(&self.db)
            .await?;

        match latest {
            Some(model) => Ok(self.with_children(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Auction>, DbErr> {
        let parents = Auctions::find()
            .filter(auctions::Column::AuctionDate.between(start, end))
            .order_by(auctions::Column::AuctionDate, Order::Desc)
            .order_by(auctions::Column::Id, Order::Desc)
            .all(&self.db)
            .await?;

        self.with_children(parents).await
    }

    async fn find_all(&self) -> Result<Vec<Auction>, DbErr> {
        let parents = Auctions::find()
            .order_by(auctions::Column::AuctionDate, Order::Desc)
            .order_by(auctions::Column::Id, Order::Desc)
            .all(&self.db)
            .await?;

        self.with_children(parents).await
    }

    async fn count(&self) -> Result<u64, DbErr> {
        Auctions::find().count(&self.db).await
    }
}

fn aggregate(
    parent: auctions::Model,
    regions: Vec<AuctionRegion>,
    technologies: Vec<AuctionTechnology>,
) -> Auction {
    Auction {
        id: parent.id,
        auction_date: parent.auction_date,
        production_month: parent.production_month,
        reserve_price: parent.reserve_price,
        created_at: parent.created_at,
        regions,
        technologies,
    }
}

impl From<auction_regions::Model> for AuctionRegion {
    fn from(row: auction_regions::Model) -> Self {
        Self {
            region_name: row.region_name,
            volume_offered: row.volume_offered,
            volume_allocated: row.volume_allocated,
            weighted_avg_price: row.weighted_avg_price,
        }
    }
}

impl From<auction_technologies::Model> for AuctionTechnology {
    fn from(row: auction_technologies::Model) -> Self {
        Self {
            technology_type: row.technology_type,
            volume_offered: row.volume_offered,
            volume_allocated: row.volume_allocated,
            weighted_avg_price: row.weighted_avg_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, Utc};
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn created_at() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    fn new_auction(created_at: NaiveDateTime) -> NewAuction {
        NewAuction {
            auction_date: NaiveDate::from_ymd_opt(2025, 3, 18).unwrap(),
            production_month: "February 2025".to_string(),
            reserve_price: dec!(0.15),
            created_at,
            regions: vec![AuctionRegion {
                region_name: "Bretagne".to_string(),
                volume_offered: 1_943_184,
                volume_allocated: 1_200_000,
                weighted_avg_price: dec!(0.47),
            }],
            technologies: vec![],
        }
    }

    fn stored_parent(created_at: NaiveDateTime) -> auctions::Model {
        auctions::Model {
            id: 7,
            auction_date: NaiveDate::from_ymd_opt(2025, 3, 18).unwrap(),
            production_month: "February 2025".to_string(),
            reserve_price: dec!(0.15),
            created_at,
        }
    }

    fn statements(db: DatabaseConnection) -> Vec<String> {
        db.into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().iter().map(|stmt| stmt.sql.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_save_commits_parent_and_children_together() {
        let now = created_at();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored_parent(now)]])
            .append_query_results([[auction_regions::Model {
                id: 1,
                auction_id: 7,
                region_name: "Bretagne".to_string(),
                volume_offered: 1_943_184,
                volume_allocated: 1_200_000,
                weighted_avg_price: dec!(0.47),
                created_at: now,
            }]])
            .into_connection();
        let repository = SeaOrmAuctionRepository::new(db);

        let saved = repository.save(new_auction(now)).await.unwrap();
        assert_eq!(saved.id, 7);
        assert_eq!(saved.regions.len(), 1);

        let sql = statements(repository.db);
        assert_eq!(sql.first().map(String::as_str), Some("BEGIN"));
        assert!(sql[1].starts_with(r#"INSERT INTO "auctions""#));
        assert!(sql[2].starts_with(r#"INSERT INTO "auction_regions""#));
        assert_eq!(sql.last().map(String::as_str), Some("COMMIT"));
    }

    #[tokio::test]
    async fn test_failed_child_insert_rolls_back_parent() {
        let now = created_at();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored_parent(now)]])
            .append_query_errors([DbErr::Custom(
                "value too long for type character varying(255)".to_string(),
            )])
            .into_connection();
        let repository = SeaOrmAuctionRepository::new(db);

        assert!(repository.save(new_auction(now)).await.is_err());

        let sql = statements(repository.db);
        assert_eq!(sql.first().map(String::as_str), Some("BEGIN"));
        assert!(sql[1].starts_with(r#"INSERT INTO "auctions""#));
        assert!(!sql.iter().any(|stmt| stmt == "COMMIT"));
        assert_eq!(sql.last().map(String::as_str), Some("ROLLBACK"));
    }
}
