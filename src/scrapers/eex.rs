//! Single-pass extraction of an EEX French auction results page.

use chrono::NaiveDate;
use scraper::Html;

use super::metadata::extract_metadata;
use super::section::{SectionHints, locate_results_section};
use super::tables::{extract_rows, locate_tables};
use super::{ScrapedAuction, TableKind};
use crate::error::ScrapeError;
use crate::models::auction::RunStage;

/// Parse `body` and pull out metadata plus both result tables.
///
/// `stage` is advanced as extraction proceeds so a caller can tell where a
/// failure happened. `Html` is not `Send`, so everything is extracted into
/// owned values before returning.
pub fn parse_results_page(
    body: &str,
    today: NaiveDate,
    stage: &mut RunStage,
) -> Result<ScrapedAuction, ScrapeError> {
    *stage = RunStage::Locating;
    let document = Html::parse_document(body);
    let hints = SectionHints::for_date(today);

    let Some(section) = locate_results_section(&document, &hints) else {
        tracing::warn!("Could not find Results section on auction page");
        return Err(ScrapeError::StructureNotFound("results section"));
    };

    *stage = RunStage::ExtractingMetadata;
    let metadata = extract_metadata(&section, today);

    *stage = RunStage::ExtractingTables;
    let tables = locate_tables(&section);

    let regions = match tables.regional {
        Some(table) => {
            tracing::info!("Found regional data table");
            extract_rows(&table, TableKind::Regional)
        }
        None => {
            tracing::warn!("Could not find regional data table");
            Vec::new()
        }
    };

    let technologies = match tables.technology {
        Some(table) => {
            tracing::info!("Found technology data table");
            extract_rows(&table, TableKind::Technology)
        }
        None => {
            tracing::warn!("Could not find technology data table");
            Vec::new()
        }
    };

    Ok(ScrapedAuction {
        metadata,
        regions,
        technologies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const PAGE: &str = include_str!("../../tests/fixtures/eex_results.html");

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 18).unwrap()
    }

    #[test]
    fn test_parse_fixture_page() {
        let mut stage = RunStage::Fetching;
        let auction = parse_results_page(PAGE, today(), &mut stage).unwrap();

        assert_eq!(stage, RunStage::ExtractingTables);
        assert_eq!(auction.metadata.production_month, "February 2025");
        assert_eq!(auction.metadata.reserve_price, dec!(0.15));
        assert_eq!(auction.metadata.auction_date, today());

        assert_eq!(auction.regions.len(), 3);
        assert_eq!(auction.regions[0].label, "Auvergne-Rhône-Alpes");
        assert_eq!(auction.regions[0].volume_offered, 236995);
        assert_eq!(auction.regions[1].volume_offered, 1943184);

        let labels: Vec<&str> = auction.technologies.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["Hydro", "Wind", "Solar"]);
        assert_eq!(auction.technologies[2].weighted_avg_price, dec!(0.49));
    }

    #[test]
    fn test_restyled_page_keeps_both_tables_and_reserve() {
        let page = PAGE
            .replace("col-xl-8 offset-xl-2", "col-lg-10")
            .replace("<h2>Results</h2>", "<h2>Latest auction</h2>")
            .replace("0,15&nbsp;€/MWh", "0,22&nbsp;€/MWh");
        let mut stage = RunStage::Fetching;
        let auction = parse_results_page(&page, today(), &mut stage).unwrap();

        assert_eq!(auction.metadata.production_month, "February 2025");
        assert_eq!(auction.metadata.reserve_price, dec!(0.22));
        assert_eq!(auction.regions.len(), 3);
        assert_eq!(auction.technologies.len(), 3);
    }

    #[test]
    fn test_lowercase_results_heading() {
        let page = PAGE.replace("<h2>Results</h2>", "<h2>Auction results</h2>");
        let mut stage = RunStage::Fetching;
        let auction = parse_results_page(&page, today(), &mut stage).unwrap();

        assert_eq!(auction.regions.len(), 3);
        assert_eq!(auction.technologies.len(), 3);
        assert_eq!(auction.metadata.reserve_price, dec!(0.15));
    }

    #[test]
    fn test_missing_section_reports_locating_stage() {
        let mut stage = RunStage::Fetching;
        let err = parse_results_page("<html><body><p>Maintenance</p></body></html>", today(), &mut stage)
            .unwrap_err();

        assert!(matches!(err, ScrapeError::StructureNotFound(_)));
        assert_eq!(stage, RunStage::Locating);
    }

    #[test]
    fn test_section_without_tables_yields_empty_auction() {
        let page = r#"<div class="col-xl-8 offset-xl-2"><h2>Results</h2><p>Coming soon</p></div>"#;
        let mut stage = RunStage::Fetching;
        let auction = parse_results_page(page, today(), &mut stage).unwrap();

        assert!(auction.is_empty());
    }
}
