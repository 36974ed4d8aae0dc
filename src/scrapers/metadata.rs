use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Selector};

use super::parser::{element_text, parse_decimal};
use super::{AuctionMetadata, DEFAULT_RESERVE_PRICE, UNKNOWN_PRODUCTION_MONTH};

lazy_static! {
    static ref MONTH_YEAR_REGEX: Regex = Regex::new(
        r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{4}\b"
    ).unwrap();

    // "The reserve price for the May auctions is: 0,15 €/MWh"
    static ref RESERVE_PRICE_REGEX: Regex = Regex::new(
        r"(?i)reserve\s+price.*?(\d+[.,]\d+).*?(?:€|EUR)\s*/\s*MWh"
    ).unwrap();

    static ref SPANNING_HEADER: Selector = Selector::parse(r#"th[colspan="4"]"#).unwrap();
    static ref HEADER_CELL: Selector = Selector::parse("th").unwrap();
}

/// Read production month and reserve price from the results section.
///
/// Missing values fall back to defaults so that good table rows are still
/// saved: the month becomes "Unknown" and the reserve price 0.15 EUR/MWh.
/// The page carries no auction date, so `today` is used.
pub fn extract_metadata(section: &ElementRef<'_>, today: NaiveDate) -> AuctionMetadata {
    let section_text = element_text(section);

    let production_month = match find_production_month(section, &section_text) {
        Some(month) => {
            tracing::info!("Found production month: {}", month);
            month
        }
        None => {
            tracing::warn!("Could not find production month, using '{}'", UNKNOWN_PRODUCTION_MONTH);
            UNKNOWN_PRODUCTION_MONTH.to_string()
        }
    };

    let reserve_price = match find_reserve_price(&section_text) {
        Some(price) => {
            tracing::info!("Found reserve price: {}", price);
            price
        }
        None => {
            tracing::warn!("Could not find reserve price, using default: {}", DEFAULT_RESERVE_PRICE);
            DEFAULT_RESERVE_PRICE
        }
    };

    let metadata = AuctionMetadata {
        auction_date: today,
        production_month,
        reserve_price,
    };

    tracing::info!(
        "Extracted metadata: auction={}, production={}, reserve={}",
        metadata.auction_date,
        metadata.production_month,
        metadata.reserve_price
    );

    metadata
}

fn find_production_month(section: &ElementRef<'_>, section_text: &str) -> Option<String> {
    section
        .select(&SPANNING_HEADER)
        .chain(section.select(&HEADER_CELL))
        .find_map(|cell| month_year_in(&element_text(&cell)))
        .or_else(|| month_year_in(section_text))
}

fn month_year_in(text: &str) -> Option<String> {
    MONTH_YEAR_REGEX.find(text).map(|m| m.as_str().to_string())
}

pub(crate) fn find_reserve_price(text: &str) -> Option<rust_decimal::Decimal> {
    RESERVE_PRICE_REGEX
        .captures(text)
        .and_then(|cap| parse_decimal(&cap[1]))
}
