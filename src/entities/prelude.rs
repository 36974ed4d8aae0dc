//! `SeaORM` Entity prelude

pub use super::auction_regions::Entity as AuctionRegions;
pub use super::auction_technologies::Entity as AuctionTechnologies;
pub use super::auctions::Entity as Auctions;
