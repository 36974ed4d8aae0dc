use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Auctions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Auctions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Auctions::AuctionDate).date().not_null())
                    .col(
                        ColumnDef::new(Auctions::ProductionMonth)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Auctions::ReservePrice)
                            .decimal_len(12, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Auctions::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // One auction per (date, production month)
        manager
            .create_index(
                Index::create()
                    .name("idx_auctions_natural_key")
                    .table(Auctions::Table)
                    .col(Auctions::AuctionDate)
                    .col(Auctions::ProductionMonth)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuctionRegions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuctionRegions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuctionRegions::AuctionId).integer().not_null())
                    .col(
                        ColumnDef::new(AuctionRegions::RegionName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuctionRegions::VolumeOffered)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuctionRegions::VolumeAllocated)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuctionRegions::WeightedAvgPrice)
                            .decimal_len(12, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuctionRegions::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_auction_regions_auction")
                            .from(AuctionRegions::Table, AuctionRegions::AuctionId)
                            .to(Auctions::Table, Auctions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuctionTechnologies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuctionTechnologies::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AuctionTechnologies::AuctionId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuctionTechnologies::TechnologyType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuctionTechnologies::VolumeOffered)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuctionTechnologies::VolumeAllocated)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuctionTechnologies::WeightedAvgPrice)
                            .decimal_len(12, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuctionTechnologies::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_auction_technologies_auction")
                            .from(AuctionTechnologies::Table, AuctionTechnologies::AuctionId)
                            .to(Auctions::Table, Auctions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_auction_regions_auction_id")
                    .table(AuctionRegions::Table)
                    .col(AuctionRegions::AuctionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_auction_technologies_auction_id")
                    .table(AuctionTechnologies::Table)
                    .col(AuctionTechnologies::AuctionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuctionTechnologies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuctionRegions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Auctions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Auctions {
    Table,
    Id,
    AuctionDate,
    ProductionMonth,
    ReservePrice,
    CreatedAt,
}

#[derive(Iden)]
enum AuctionRegions {
    Table,
    Id,
    AuctionId,
    RegionName,
    VolumeOffered,
    VolumeAllocated,
    WeightedAvgPrice,
    CreatedAt,
}

#[derive(Iden)]
enum AuctionTechnologies {
    Table,
    Id,
    AuctionId,
    TechnologyType,
    VolumeOffered,
    VolumeAllocated,
    WeightedAvgPrice,
    CreatedAt,
}
