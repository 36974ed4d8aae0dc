use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use scraper::ElementRef;

lazy_static! {
    // Currency marker, then the first number after it: "€ 0.49", "€0,15", "EUR 1"
    static ref PRICE_REGEX: Regex = Regex::new(r"(?:€|EUR)\D*?(\d+(?:[.,]\d+)?)").unwrap();

    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

/// Parse a volume written with dots as thousands separators.
///
/// Every non-digit is dropped, so "236.995" becomes 236995 and
/// "1.943.184 MWh" becomes 1943184. Returns `None` when no digit is left
/// (never a silent zero) or the value does not fit an `i64`.
pub fn parse_volume(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok()
}

/// Parse a price such as "€ 0,15" or "€ 0.49" into EUR/MWh.
///
/// The number must follow a currency marker. A single separator is always
/// read as the decimal point, whether comma or dot: "€ 1.234" is 1.234.
pub fn parse_price(text: &str) -> Option<Decimal> {
    let cap = PRICE_REGEX.captures(text)?;
    parse_decimal(&cap[1])
}

/// Decimal with either comma or dot as separator.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(&text.trim().replace(',', ".")).ok()
}

/// Trim and collapse inner whitespace runs (including non-breaking spaces).
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text.trim(), " ").into_owned()
}

/// All text below `element`, whitespace-normalized.
pub fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Text held directly by `element`, ignoring its child elements.
pub fn own_text(element: &ElementRef<'_>) -> String {
    let joined = element
        .children()
        .filter_map(|child| child.value().as_text().map(|text| &**text))
        .collect::<Vec<_>>()
        .join(" ");
    collapse_whitespace(&joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use scraper::{Html, Selector};

    #[test]
    fn test_parse_volume_dot_thousands() {
        assert_eq!(parse_volume("236.995"), Some(236995));
        assert_eq!(parse_volume("1.943.184"), Some(1943184));
        assert_eq!(parse_volume(" 12.000 MWh "), Some(12000));
        assert_eq!(parse_volume("0"), Some(0));
    }

    #[test]
    fn test_parse_volume_without_digits() {
        assert_eq!(parse_volume(""), None);
        assert_eq!(parse_volume("n/a"), None);
        assert_eq!(parse_volume(" - "), None);
    }

    #[test]
    fn test_parse_volume_overflow() {
        assert_eq!(parse_volume("99999999999999999999999"), None);
    }

    #[test]
    fn test_parse_price_comma_and_dot() {
        assert_eq!(parse_price("€ 0,15"), Some(dec!(0.15)));
        assert_eq!(parse_price("€ 0.49"), Some(dec!(0.49)));
        assert_eq!(parse_price("€0.5"), Some(dec!(0.5)));
        assert_eq!(parse_price("EUR 2"), Some(dec!(2)));
    }

    #[test]
    fn test_parse_price_non_breaking_space() {
        assert_eq!(parse_price("€\u{a0}1,05"), Some(dec!(1.05)));
    }

    #[test]
    fn test_parse_price_single_separator_is_decimal() {
        assert_eq!(parse_price("€ 1.234"), Some(dec!(1.234)));
        assert_eq!(parse_price("€ 1,234"), Some(dec!(1.234)));
    }

    #[test]
    fn test_parse_price_requires_currency_marker() {
        assert_eq!(parse_price("0,15"), None);
        assert_eq!(parse_price("0.49 per MWh"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("€ n/a"), None);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Grand \n\t Est  "), "Grand Est");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_own_text_skips_children() {
        let html = Html::parse_fragment("<div>Results <span>hidden</span> 2025</div>");
        let selector = Selector::parse("div").unwrap();
        let div = html.select(&selector).next().unwrap();
        assert_eq!(own_text(&div), "Results 2025");
        assert_eq!(element_text(&div), "Results hidden 2025");
    }
}
