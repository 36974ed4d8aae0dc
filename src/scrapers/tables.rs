use lazy_static::lazy_static;
use scraper::{ElementRef, Selector};

use super::parser::{element_text, parse_price, parse_volume};
use super::{ScrapedRow, TableKind};

lazy_static! {
    static ref TABLE: Selector = Selector::parse("table").unwrap();
    static ref ROW: Selector = Selector::parse("tr").unwrap();
    static ref DATA_CELL: Selector = Selector::parse("td").unwrap();
    // On this page genuine header labels are wrapped in <p>
    static ref HEADER_MARKER: Selector = Selector::parse("p").unwrap();
}

const VOLUME_OFFERED_HEADER: &str = "Volume Offered";

/// Located result tables; either may be missing.
#[derive(Debug, Clone, Copy)]
pub struct ResultTables<'a> {
    pub regional: Option<ElementRef<'a>>,
    pub technology: Option<ElementRef<'a>>,
}

pub fn locate_tables<'a>(section: &ElementRef<'a>) -> ResultTables<'a> {
    ResultTables {
        regional: find_regional_table(section),
        technology: find_technology_table(section),
    }
}

/// First table with a `<p>`-wrapped "Region" header.
pub fn find_regional_table<'a>(section: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    section
        .select(&TABLE)
        .find(|table| has_marked_text(table, TableKind::Regional.header_label()))
}

/// First table with a plain "Technology" cell and no `<p>`-wrapped one.
pub fn find_technology_table<'a>(section: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    let label = TableKind::Technology.header_label();

    section.select(&TABLE).find(|table| {
        let plain_cell = table
            .select(&DATA_CELL)
            .any(|cell| element_text(&cell).contains(label));
        plain_cell && !has_marked_text(table, label)
    })
}

fn has_marked_text(element: &ElementRef<'_>, label: &str) -> bool {
    element
        .select(&HEADER_MARKER)
        .any(|marker| element_text(&marker).contains(label))
}

/// Convert a table's data rows into records.
///
/// Restated header rows are skipped. A row needs at least four cells, a
/// label, two volumes and a price; anything short of that is dropped and
/// logged without affecting the other rows.
pub fn extract_rows(table: &ElementRef<'_>, kind: TableKind) -> Vec<ScrapedRow> {
    let candidates: Vec<ElementRef<'_>> = table
        .select(&ROW)
        .filter(|row| row.select(&DATA_CELL).next().is_some())
        .filter(|row| !is_header_row(row, kind))
        .collect();

    tracing::info!("Found {} {} data rows", candidates.len(), kind.as_str());

    let mut rows = Vec::with_capacity(candidates.len());
    for row in candidates {
        match parse_row(&row) {
            Ok(parsed) => {
                tracing::debug!(
                    "Parsed {} row: {} - {} MWh at €{}/MWh",
                    kind.as_str(),
                    parsed.label,
                    parsed.volume_allocated,
                    parsed.weighted_avg_price
                );
                rows.push(parsed);
            }
            Err(reason) => {
                tracing::debug!(
                    "Skipping {} row '{}': {}",
                    kind.as_str(),
                    element_text(&row),
                    reason
                );
            }
        }
    }

    rows
}

fn is_header_row(row: &ElementRef<'_>, kind: TableKind) -> bool {
    row.select(&DATA_CELL).any(|cell| {
        let text = element_text(&cell);
        text.contains(kind.header_label()) || text.contains(VOLUME_OFFERED_HEADER)
    })
}

fn parse_row(row: &ElementRef<'_>) -> Result<ScrapedRow, &'static str> {
    let cells: Vec<String> = row.select(&DATA_CELL).map(|cell| cell_text(&cell)).collect();
    if cells.len() < 4 {
        return Err("fewer than 4 cells");
    }

    let label = cells[0].clone();
    if label.is_empty() {
        return Err("empty label");
    }

    let volume_offered = parse_volume(&cells[1]).ok_or("unparseable volume offered")?;
    let volume_allocated = parse_volume(&cells[2]).ok_or("unparseable volume allocated")?;
    let weighted_avg_price = parse_price(&cells[3]).ok_or("unparseable price")?;

    Ok(ScrapedRow {
        label,
        volume_offered,
        volume_allocated,
        weighted_avg_price,
    })
}

/// Cell text, taken from a nested `<p>` when there is one.
fn cell_text(cell: &ElementRef<'_>) -> String {
    match cell.select(&HEADER_MARKER).next() {
        Some(inner) => element_text(&inner),
        None => element_text(cell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use scraper::Html;

    const SECTION: &str = r#"
        <div id="results">
          <table id="other"><tr><td>Calendar</td><td>Dates</td></tr></table>
          <table id="regional">
            <caption><p>Technology breakdown follows below</p></caption>
            <tr><td><p>Region</p></td><td><p>Volume Offered</p></td><td><p>Volume Allocated</p></td><td><p>Price</p></td></tr>
            <tr><td><p>Grand Est</p></td><td><p>236.995</p></td><td><p>200.000</p></td><td><p>€ 0,50</p></td></tr>
            <tr><td>Occitanie</td><td>1.943.184</td><td>1.000.000</td><td>€ 0.49</td></tr>
          </table>
          <table id="technology">
            <tr><td>Technology</td><td>Volume Offered</td><td>Volume Allocated</td><td>Price</td></tr>
            <tr><td>Hydro</td><td>12.000</td><td>11.500</td><td>€ 0,52</td></tr>
            <tr><td>Wind</td><td>9.000</td><td>n/a</td><td>€ 0,40</td></tr>
            <tr><td>Solar</td><td>7.000</td><td>7.000</td></tr>
            <tr><td>  </td><td>1.000</td><td>1.000</td><td>€ 0,30</td></tr>
            <tr><td>Biomass</td><td>3.000</td><td>2.000</td><td>0,30</td></tr>
          </table>
        </div>"#;

    fn with_section<R>(f: impl FnOnce(ElementRef<'_>) -> R) -> R {
        let html = Html::parse_document(SECTION);
        let selector = Selector::parse("div#results").unwrap();
        let section = html.select(&selector).next().unwrap();
        f(section)
    }

    #[test]
    fn test_locate_tables_by_content() {
        with_section(|section| {
            let tables = locate_tables(&section);
            assert_eq!(tables.regional.unwrap().value().attr("id"), Some("regional"));
            assert_eq!(tables.technology.unwrap().value().attr("id"), Some("technology"));
        });
    }

    #[test]
    fn test_technology_table_ignores_marked_mentions() {
        let html = Html::parse_document(
            r#"<div><table id="t"><tr><td><p>Technology</p></td></tr></table></div>"#,
        );
        let selector = Selector::parse("div").unwrap();
        let section = html.select(&selector).next().unwrap();
        assert!(find_technology_table(&section).is_none());
        assert!(find_regional_table(&section).is_none());
    }

    #[test]
    fn test_regional_rows() {
        with_section(|section| {
            let table = find_regional_table(&section).unwrap();
            let rows = extract_rows(&table, TableKind::Regional);

            assert_eq!(
                rows,
                vec![
                    ScrapedRow {
                        label: "Grand Est".to_string(),
                        volume_offered: 236995,
                        volume_allocated: 200000,
                        weighted_avg_price: dec!(0.50),
                    },
                    ScrapedRow {
                        label: "Occitanie".to_string(),
                        volume_offered: 1943184,
                        volume_allocated: 1000000,
                        weighted_avg_price: dec!(0.49),
                    },
                ]
            );
        });
    }

    #[test]
    fn test_malformed_rows_are_dropped() {
        with_section(|section| {
            let table = find_technology_table(&section).unwrap();
            let rows = extract_rows(&table, TableKind::Technology);

            // Wind: bad volume, Solar: 3 cells, blank label, Biomass: no currency
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].label, "Hydro");
            assert_eq!(rows[0].volume_offered, 12000);
            assert_eq!(rows[0].volume_allocated, 11500);
            assert_eq!(rows[0].weighted_avg_price, dec!(0.52));
        });
    }

    #[test]
    fn test_table_without_valid_rows_is_empty() {
        let html = Html::parse_document(
            r#"<table><tr><td>Technology</td><td>Volume Offered</td></tr><tr><td>x</td></tr></table>"#,
        );
        let selector = Selector::parse("table").unwrap();
        let table = html.select(&selector).next().unwrap();
        assert!(extract_rows(&table, TableKind::Technology).is_empty());
    }
}
