//! Locating the results section on the auction page.
//!
//! The page markup changes between releases, so several strategies are tried
//! in order and the first one that matches wins.

use chrono::{Datelike, Months, NaiveDate};
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

use super::parser::{element_text, own_text};

lazy_static! {
    static ref LAYOUT_CONTAINER: Selector = Selector::parse("div.col-xl-8.offset-xl-2").unwrap();
    static ref HEADING_H2: Selector = Selector::parse("h2").unwrap();
    static ref ANY_ELEMENT: Selector = Selector::parse("body *").unwrap();
    static ref TABLE: Selector = Selector::parse("table").unwrap();
}

/// Page-independent facts the strategies may use.
#[derive(Debug, Clone, Default)]
pub struct SectionHints {
    /// Production-month labels likely to appear on a current page ("February 2025").
    pub recent_months: Vec<String>,
}

impl SectionHints {
    /// Hints for a run on `today`: this month's label and the previous eleven.
    pub fn for_date(today: NaiveDate) -> Self {
        Self {
            recent_months: recent_production_months(today, 12),
        }
    }
}

pub type Strategy = for<'a> fn(&'a Html, &SectionHints) -> Option<ElementRef<'a>>;

/// Strategies in priority order.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("layout-container", by_layout_container),
    ("results-text", by_results_text),
    ("production-month-text", by_production_month_text),
    ("region-volume-price-table", by_region_volume_price_table),
];

/// Apply the strategies in order and return the first match.
pub fn locate_results_section<'a>(
    document: &'a Html,
    hints: &SectionHints,
) -> Option<ElementRef<'a>> {
    for (name, strategy) in STRATEGIES {
        if let Some(section) = strategy(document, hints) {
            tracing::info!("Found results section using '{}' strategy", name);
            return Some(section);
        }
        tracing::debug!("Results section strategy '{}' did not match", name);
    }

    None
}

/// Layout container holding a "Results" heading (any case).
pub fn by_layout_container<'a>(document: &'a Html, _hints: &SectionHints) -> Option<ElementRef<'a>> {
    document.select(&LAYOUT_CONTAINER).find(|container| {
        container
            .select(&HEADING_H2)
            .any(|heading| mentions_results(&element_text(&heading)))
    })
}

/// Any element whose own text mentions "results", in any case.
pub fn by_results_text<'a>(document: &'a Html, _hints: &SectionHints) -> Option<ElementRef<'a>> {
    document
        .select(&ANY_ELEMENT)
        .find(|element| mentions_results(&own_text(element)))
        .map(widen_to_results_area)
}

/// Any element whose own text carries a known recent production-month label.
pub fn by_production_month_text<'a>(
    document: &'a Html,
    hints: &SectionHints,
) -> Option<ElementRef<'a>> {
    if hints.recent_months.is_empty() {
        return None;
    }

    document
        .select(&ANY_ELEMENT)
        .find(|element| {
            let text = own_text(element);
            hints.recent_months.iter().any(|month| text.contains(month.as_str()))
        })
        .map(widen_to_results_area)
}

/// A table mentioning "Region", "Volume" and "Price", widened like the text
/// strategies so a sibling technology table stays inside the section.
pub fn by_region_volume_price_table<'a>(
    document: &'a Html,
    _hints: &SectionHints,
) -> Option<ElementRef<'a>> {
    document
        .select(&TABLE)
        .find(|table| {
            let text = element_text(table);
            ["Region", "Volume", "Price"]
                .iter()
                .all(|word| text.contains(word))
        })
        .map(widen_to_results_area)
}

fn mentions_results(text: &str) -> bool {
    text.to_lowercase().contains("results")
}

/// Walk up from a matched marker to the element holding the whole results
/// area: the nearest ancestor with both result tables, or with a single
/// table when the page has no second one. Falls back to the marker's parent
/// when no ancestor holds a table.
fn widen_to_results_area(marker: ElementRef<'_>) -> ElementRef<'_> {
    let mut candidates =
        std::iter::once(marker).chain(marker.ancestors().filter_map(ElementRef::wrap));

    let Some(innermost) = candidates.find(|element| table_count(element) > 0) else {
        return marker.parent().and_then(ElementRef::wrap).unwrap_or(marker);
    };

    std::iter::once(innermost)
        .chain(candidates)
        .find(|element| table_count(element) >= RESULT_TABLES)
        .unwrap_or(innermost)
}

/// Regional and technology tables.
const RESULT_TABLES: usize = 2;

fn table_count(element: &ElementRef<'_>) -> usize {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|descendant| descendant.value().name() == "table")
        .count()
}

/// Labels like "February 2025" for `today`'s month and the `count - 1` before it.
pub fn recent_production_months(today: NaiveDate, count: u32) -> Vec<String> {
    let first_of_month = today.with_day(1).unwrap_or(today);

    (0..count)
        .filter_map(|back| first_of_month.checked_sub_months(Months::new(back)))
        .map(|date| date.format("%B %Y").to_string())
        .collect()
}
