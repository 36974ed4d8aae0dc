//! `SeaORM` Entity for auction_technologies table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "auction_technologies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub auction_id: i32,
    /// Generation technology, e.g. "Hydro" or "Wind"
    pub technology_type: String,
    pub volume_offered: i64,
    pub volume_allocated: i64,
    #[sea_orm(column_type = "Decimal(Some((12, 4)))")]
    pub weighted_avg_price: Decimal,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::auctions::Entity",
        from = "Column::AuctionId",
        to = "super::auctions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Auctions,
}

impl Related<super::auctions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Auctions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
