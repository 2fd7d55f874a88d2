//! Whitespace tokenizer for raw OCR text.
//!
//! OCR engines hand back text with literal `\n` escape markers (some join
//! paragraphs with the two characters `\` `n`), non-breaking spaces and
//! zero-width spaces. All of these are turned into ordinary spaces before
//! splitting.

/// Literal escape markers and invisible spaces that act as separators.
const SEPARATORS: [&str; 8] = [
    "\\r\\n", "\\n", "\\r", "\u{00A0}", "\u{202F}", "\u{200B}", "\u{FEFF}", "\u{2060}",
];

/// Replaces literal escape markers and invisible spaces with a plain space.
///
/// # Example
///
/// ```
/// use damage_ledger::parsing::normalize_separators;
///
/// assert_eq!(normalize_separators("316\\nJHackenbroich"), "316 JHackenbroich");
/// ```
pub fn normalize_separators(text: &str) -> String {
    SEPARATORS
        .iter()
        .fold(text.to_string(), |acc, sep| acc.replace(sep, " "))
}

/// Splits OCR text into non-empty tokens.
///
/// Never fails: empty or whitespace-only input yields no tokens.
///
/// # Example
///
/// ```
/// use damage_ledger::parsing::tokenize;
///
/// let tokens = tokenize("RD\u{00A0}ID\\nRegulierer  Sachverständiger\u{200B}");
/// assert_eq!(tokens, vec!["RD", "ID", "Regulierer", "Sachverständiger"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    normalize_separators(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
