//! Block grammar for reports whose table was flattened by OCR.
//!
//! Database report exports often come back from OCR as one token run: the
//! column headers, then `count name` pairs, then the `RD ID` header, then the
//! damage-type column:
//!
//! ```text
//! AnzahlvonSCHADEN ZUSTAENDIG 316 JHackenbroich 169 MMueller RD ID Regulierer Sachverständiger
//! ```
//!
//! Pairs and type labels are linked only by position. If OCR scanned the
//! columns in a different order the types are silently misassigned; there is
//! no evidence in the text to detect that.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Record;

use super::header_boundary::{find_header_boundary, is_header_word};
use super::tokenizer::tokenize;

/// Column headers of the count/name segment, after umlaut folding.
const LEFT_HEADERS: [&str; 3] = ["ANZAHLVONSCHADEN", "ANZAHLVONSCHAEDEN", "ZUSTAENDIG"];

static COUNT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(?:\.\d{3})*$").expect("built-in count pattern is valid")
});

/// Upper-cases, folds German umlauts and drops trailing `:`/`,`.
fn fold_header(token: &str) -> String {
    token
        .trim_end_matches([':', ','])
        .to_uppercase()
        .replace('Ä', "AE")
        .replace('Ö', "OE")
        .replace('Ü', "UE")
}

fn is_left_header(token: &str) -> bool {
    let folded = fold_header(token);
    LEFT_HEADERS.contains(&folded.as_str())
}

/// Reads a count token such as `316` or `1.234`.
fn parse_count(token: &str) -> Option<u64> {
    if !COUNT_TOKEN.is_match(token) {
        return None;
    }
    let digits: String = token.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Collects `(count, employee)` pairs with a two-token stride, stepping
/// over tokens that are not counts.
fn collect_pairs(tokens: &[String]) -> Vec<(u64, &str)> {
    let mut pairs = Vec::new();
    let mut i = 0;

    while i + 1 < tokens.len() {
        match parse_count(&tokens[i]) {
            Some(count) => {
                pairs.push((count, tokens[i + 1].as_str()));
                i += 2;
            }
            None => i += 1,
        }
    }

    pairs
}

/// Parses one image's OCR text in the block grammar.
///
/// Never fails: text without a header boundary, without pairs or without
/// type labels yields an empty list.
///
/// # Example
///
/// ```
/// use damage_ledger::parsing::parse_block;
///
/// let records = parse_block(
///     "AnzahlvonSCHADEN ZUSTAENDIG 316 JHackenbroich 169 MMueller RD ID Regulierer Sachverständiger",
/// );
///
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].employee(), "JHackenbroich");
/// assert_eq!(records[1].damage_type(), Some("Sachverständiger"));
/// ```
pub fn parse_block(text: &str) -> Vec<Record> {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return Vec::new();
    }

    let (left, right) = match find_header_boundary(&tokens) {
        Some(boundary) => tokens.split_at(boundary),
        None => (tokens.as_slice(), &[][..]),
    };

    let data_start = left
        .iter()
        .position(|token| !is_left_header(token))
        .unwrap_or(left.len());
    let pairs = collect_pairs(&left[data_start..]);

    let labels: Vec<&str> = right
        .iter()
        .filter(|token| !is_header_word(token))
        .filter(|token| token.chars().any(char::is_alphabetic))
        .map(String::as_str)
        .collect();

    pairs
        .into_iter()
        .zip(labels)
        .filter_map(|((count, employee), label)| Record::new(count, employee, Some(label)))
        .filter(|record| record.damage_type().is_some())
        .collect()
}
