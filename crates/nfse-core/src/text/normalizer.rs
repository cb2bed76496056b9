//! Cleanup of flattened service descriptions.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;

use super::typos::TypoTable;

lazy_static! {
    // Currency amounts: "R$ 50,00", "R$1.234,56"
    static ref CURRENCY_AMOUNT: Regex = Regex::new(r"R\$\s*\d+(?:[.,]\d+)+").unwrap();

    // Line item labels left over from flattened tables
    static ref ITEM_LABELS: Regex = Regex::new(
        r"(?i)VALOR\s+UNIT\.:|QTDE\.:|VALOR\s+TOTAL:|TOTAL\s+GERAL:"
    ).unwrap();

    static ref DIGIT_RUN: Regex = Regex::new(r"\s*\d+\s*").unwrap();

    static ref SERVICE_START: Regex = Regex::new(r"EXAME|CONSULTA").unwrap();
}

/// Characters stripped from both ends of a normalized service line.
const EDGE_PUNCTUATION: &[char] = &[' ', '.', ',', '-'];

/// Re-segment a description that had its line items flattened into one field.
///
/// Amounts, labels and digits go first, otherwise stray numbers break the
/// `EXAME`/`CONSULTA` split. Lossy on purpose: any digit in the text is
/// dropped and every `EXAME`/`CONSULTA` starts a new line.
///
/// A digit run and the whitespace around it collapse to a single space, so
/// `EXAME DE 2 VIAS` becomes `EXAME DE VIAS` rather than gluing the
/// neighbouring words together.
pub fn clean_description(raw: &str) -> String {
    let text = CURRENCY_AMOUNT.replace_all(raw, "");
    let text = ITEM_LABELS.replace_all(&text, "");
    let text = DIGIT_RUN.replace_all(&text, " ");
    let text = text.replace("??", "");
    let text = SERVICE_START.replace_all(&text, "\n${0}");

    text.split('\n')
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Canonical, deduplicated and sorted service lines from extracted text.
pub fn normalize_services(raw: &str) -> Vec<String> {
    normalize_services_with(raw, TypoTable::builtin())
}

/// [`normalize_services`] with a custom rule table.
pub fn normalize_services_with(raw: &str, table: &TypoTable) -> Vec<String> {
    collect_services(
        raw.split(is_line_break)
            .filter(|line| !line.trim().is_empty())
            .map(|line| normalize_line(line, table)),
    )
}

/// Line terminators accepted in raw text, including the form feed that PDF
/// extraction emits between pages and the Unicode line/paragraph separators.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Upper-case, correct, collapse whitespace and trim edge punctuation.
pub fn normalize_line(line: &str, table: &TypoTable) -> String {
    let corrected = table.apply(&line.to_uppercase());
    collapse_whitespace(&corrected)
        .trim_matches(EDGE_PUNCTUATION)
        .to_string()
}

/// Drop empty lines, deduplicate and sort.
pub fn collect_services<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    lines
        .into_iter()
        .map(Into::into)
        .filter(|line| !line.is_empty())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
