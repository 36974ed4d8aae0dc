//! `SeaORM` Entity for auctions table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "auctions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub auction_date: Date,
    pub production_month: String,
    /// Reserve price in EUR/MWh
    #[sea_orm(column_type = "Decimal(Some((12, 4)))")]
    pub reserve_price: Decimal,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::auction_regions::Entity")]
    AuctionRegions,
    #[sea_orm(has_many = "super::auction_technologies::Entity")]
    AuctionTechnologies,
}

impl Related<super::auction_regions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuctionRegions.def()
    }
}

impl Related<super::auction_technologies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuctionTechnologies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
