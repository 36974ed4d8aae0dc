pub mod auction_scraper;
