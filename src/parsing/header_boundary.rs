//! Detection of the "RD ID" header that splits a flattened report block.
//!
//! In a block-style transcription the count/name columns come first and the
//! damage-type column follows after its header, which OCR renders as `RD ID`,
//! `RDID`, `RD_ID`, `Rd-Id:` and similar variants.

/// Upper-cases a token and drops the joiners and punctuation OCR inserts
/// into header words.
fn normalize_header(token: &str) -> String {
    token
        .to_uppercase()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ':' | '.'))
        .collect()
}

/// Returns true for the header words themselves (`RD`, `ID`, `RD_ID`, ...).
pub(crate) fn is_header_word(token: &str) -> bool {
    matches!(normalize_header(token).as_str(), "RD" | "ID" | "RDID")
}

/// Finds the index where the type-label segment of a block begins.
///
/// The first `RD` immediately followed by a token starting with `ID`, or the
/// first token that reads `RDID` once joiners are removed, wins. Without such
/// a pair the last token starting with `RD` is used, since an early `RD` is
/// more likely a stray fragment inside the count/name columns. Returns `None`
/// when no token starts with `RD`.
///
/// # Example
///
/// ```
/// use damage_ledger::parsing::find_header_boundary;
///
/// let tokens = ["316", "JHackenbroich", "RD", "ID", "Regulierer"];
/// assert_eq!(find_header_boundary(&tokens), Some(2));
///
/// let tokens = ["316", "JHackenbroich", "Regulierer"];
/// assert_eq!(find_header_boundary(&tokens), None);
/// ```
pub fn find_header_boundary<S: AsRef<str>>(tokens: &[S]) -> Option<usize> {
    for (i, token) in tokens.iter().enumerate() {
        let normalized = normalize_header(token.as_ref());

        if normalized.starts_with("RDID") {
            return Some(i);
        }

        if normalized == "RD"
            && tokens
                .get(i + 1)
                .is_some_and(|next| next.as_ref().to_uppercase().starts_with("ID"))
        {
            return Some(i);
        }
    }

    tokens
        .iter()
        .rposition(|token| token.as_ref().to_uppercase().starts_with("RD"))
}
