//! Monetary value formatting (pt-BR decimal comma).

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a value written with either a decimal comma or a decimal point.
///
/// Only the separator is normalized; thousands separators are not
/// understood, so `"1.234,56"` does not parse.
pub fn parse_value(s: &str) -> Option<Decimal> {
    Decimal::from_str(&s.trim().replace(',', ".")).ok()
}

/// Two decimal places with a comma separator: `1234.5` → `"1234,50"`.
pub fn format_decimal(amount: Decimal) -> String {
    format!("{:.2}", amount).replace('.', ",")
}

/// Reformat raw value text, passing it through untouched when it is not a
/// number.
pub fn format_value(raw: &str) -> String {
    match parse_value(raw) {
        Some(amount) => format_decimal(amount),
        None => raw.to_string(),
    }
}
