//! Row grammar: one `<count> <employee> <damage-type>` record per line.
//!
//! This is the grammar produced when OCR keeps the report's table rows
//! intact, e.g. `316 JHackenbroich Regulierer`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{LedgerError, LedgerResult};
use crate::models::Record;

use super::tokenizer::normalize_separators;

/// The built-in row pattern.
///
/// The count is plain digits or digits grouped in threes by `.` or `,`.
/// Employee and damage type each start with a letter.
pub const DEFAULT_ROW_PATTERN: &str = r"^(?P<count>\d{1,3}(?:[.,]\d{3})+|\d+)\s+(?P<employee>\p{L}[\w.\-]*)\s+(?P<damage_type>\p{L}[\w.\-]*)\s*$";

static DEFAULT_ROW_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_ROW_PATTERN).expect("built-in row pattern is valid")
});

/// Capture groups every row pattern must declare.
const REQUIRED_CAPTURES: [&str; 2] = ["count", "employee"];

/// Parses line-oriented OCR text.
///
/// # Example
///
/// ```
/// use damage_ledger::parsing::RowParser;
///
/// let parser = RowParser::new();
/// let records = parser.parse("316 JHackenbroich Regulierer\n1.234 JDoe Regulierer");
///
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1].count(), 1234);
/// ```
#[derive(Debug, Clone)]
pub struct RowParser {
    pattern: Regex,
}

impl RowParser {
    /// Creates a parser using [`DEFAULT_ROW_PATTERN`].
    pub fn new() -> Self {
        Self {
            pattern: DEFAULT_ROW_REGEX.clone(),
        }
    }

    /// Creates a parser from a custom pattern.
    ///
    /// The pattern must compile and declare `count` and `employee` named
    /// captures; `damage_type` is optional.
    ///
    /// # Example
    ///
    /// ```
    /// use damage_ledger::parsing::RowParser;
    ///
    /// let parser = RowParser::with_pattern(r"^(?P<employee>\w+):\s*(?P<count>\d+)$").unwrap();
    /// let records = parser.parse("MMueller: 12");
    /// assert_eq!(records[0].count(), 12);
    /// assert_eq!(records[0].damage_type(), None);
    ///
    /// assert!(RowParser::with_pattern(r"(?P<count>\d+)").is_err());
    /// ```
    pub fn with_pattern(pattern: &str) -> LedgerResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| LedgerError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        for required in REQUIRED_CAPTURES {
            if !regex.capture_names().flatten().any(|name| name == required) {
                return Err(LedgerError::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: format!("missing capture group '{}'", required),
                });
            }
        }

        Ok(Self { pattern: regex })
    }

    /// The active pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Parses every non-blank line independently.
    ///
    /// Lines that do not match are skipped. A match whose count has no
    /// digits (or overflows) or whose employee is empty is discarded.
    pub fn parse(&self, text: &str) -> Vec<Record> {
        split_lines(text)
            .iter()
            .filter_map(|line| self.parse_line(line))
            .collect()
    }

    fn parse_line(&self, line: &str) -> Option<Record> {
        let captures = self.pattern.captures(line)?;

        let digits: String = captures
            .name("count")?
            .as_str()
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        let count = digits.parse::<u64>().ok()?;

        let employee = captures.name("employee")?.as_str();
        let damage_type = captures.name("damage_type").map(|m| m.as_str());

        Record::new(count, employee, damage_type)
    }
}

impl Default for RowParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits text into trimmed, non-blank lines, treating literal `\n` and
/// `\r` markers as line breaks.
fn split_lines(text: &str) -> Vec<String> {
    let text = text
        .replace("\\r\\n", "\n")
        .replace("\\n", "\n")
        .replace("\\r", "\n");

    text.lines()
        .map(|line| normalize_separators(line).trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn triple(record: &Record) -> (u64, &str, Option<&str>) {
        (record.count(), record.employee(), record.damage_type())
    }

    #[test]
    fn test_single_row() {
        let records = RowParser::new().parse("316 JHackenbroich Regulierer");
        assert_eq!(records.len(), 1);
        assert_eq!(triple(&records[0]), (316, "JHackenbroich", Some("Regulierer")));
    }

    #[test]
    fn test_rows_in_line_order() {
        let text = "316 JHackenbroich Regulierer\n\n  169 MMueller Sachverständiger  \n";
        let records = RowParser::new().parse(text);
        assert_eq!(records.len(), 2);
        assert_eq!(triple(&records[0]), (316, "JHackenbroich", Some("Regulierer")));
        assert_eq!(triple(&records[1]), (169, "MMueller", Some("Sachverständiger")));
    }

    #[test]
    fn test_thousands_separator() {
        let records = RowParser::new().parse("1.234 JDoe Regulierer");
        assert_eq!(triple(&records[0]), (1234, "JDoe", Some("Regulierer")));

        let records = RowParser::new().parse("12,345 JDoe Regulierer");
        assert_eq!(records[0].count(), 12345);
    }

    #[test]
    fn test_literal_newline_markers_split_rows() {
        let records = RowParser::new().parse("5 A Regulierer\\n7 B Regulierer");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].employee(), "B");
    }

    #[test]
    fn test_non_matching_lines_skipped() {
        let text = "AnzahlvonSCHADEN ZUSTAENDIG RD ID\n316 JHackenbroich Regulierer\nSeite 1";
        let records = RowParser::new().parse(text);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_block_text_yields_nothing() {
        let text = "AnzahlvonSCHADEN ZUSTAENDIG 316 JHackenbroich 169 MMueller RD ID Regulierer Sachverständiger";
        assert!(RowParser::new().parse(text).is_empty());
    }

    #[test]
    fn test_empty_and_garbage_input() {
        assert!(RowParser::new().parse("").is_empty());
        assert!(RowParser::new().parse("%%% ### !!!\n\u{200B}").is_empty());
    }

    #[test]
    fn test_overflowing_count_discarded() {
        let records = RowParser::new().parse("99999999999999999999999 A Regulierer");
        assert!(records.is_empty());
    }

    #[test]
    fn test_custom_pattern_without_type() {
        let parser = RowParser::with_pattern(r"^(?P<count>\S+)\s+(?P<employee>\w+)$").unwrap();
        let records = parser.parse("1'200 MMueller\nx7 B");
        assert_eq!(records.len(), 2);
        assert_eq!(triple(&records[0]), (1200, "MMueller", None));
        assert_eq!(records[1].count(), 7);
    }

    #[test]
    fn test_custom_pattern_discards_digitless_count() {
        let parser = RowParser::with_pattern(r"^(?P<count>\S+)\s+(?P<employee>\w+)$").unwrap();
        assert!(parser.parse("abc MMueller").is_empty());
    }

    #[test]
    fn test_custom_pattern_discards_empty_employee() {
        let parser =
            RowParser::with_pattern(r"^(?P<count>\d+)\s*(?P<employee>\w*)\s*(?P<damage_type>\w*)$")
                .unwrap();
        assert!(parser.parse("12").is_empty());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = RowParser::with_pattern("(?P<count>\\d+");
        assert!(matches!(result, Err(LedgerError::InvalidPattern { .. })));
    }

    #[test]
    fn test_pattern_without_employee_rejected() {
        match RowParser::with_pattern(r"(?P<count>\d+)") {
            Err(LedgerError::InvalidPattern { message, .. }) => {
                assert!(message.contains("employee"));
            }
            other => panic!("Expected InvalidPattern, got {:?}", other),
        }
    }

    proptest! {
        #[test]
        fn prop_row_round_trip(
            count in 0u64..10_000_000_000,
            name in "[A-Za-z]{1,16}",
            damage_type in "[A-Za-zäöüÄÖÜß]{1,20}",
        ) {
            let line = format!("{} {} {}", count, name, damage_type);
            let records = RowParser::new().parse(&line);

            prop_assert_eq!(records.len(), 1);
            prop_assert_eq!(records[0].count(), count);
            prop_assert_eq!(records[0].employee(), name.as_str());
            prop_assert_eq!(records[0].damage_type(), Some(damage_type.as_str()));
        }

        #[test]
        fn prop_never_panics_on_arbitrary_text(text in "\\PC{0,200}") {
            let _ = RowParser::new().parse(&text);
        }
    }
}
