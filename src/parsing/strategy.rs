//! Ordered grammar chain.
//!
//! OCR text is offered to each grammar in turn; the first grammar that
//! recovers at least one record wins. The default order is the row grammar,
//! then the block grammar: row-style text never contains a usable block, but
//! block-style text occasionally contains a line that looks like a row.

use tracing::debug;

use crate::error::LedgerResult;
use crate::models::Record;

use super::block_parser::parse_block;
use super::row_parser::RowParser;
use super::tokenizer::tokenize;

/// A text grammar that recovers records from OCR output.
pub trait GrammarStrategy: Send + Sync {
    /// Short name used in logs and booking reports.
    fn name(&self) -> &'static str;

    /// Recovers records; must not fail on unrecognized input.
    fn parse(&self, text: &str) -> Vec<Record>;
}

impl GrammarStrategy for RowParser {
    fn name(&self) -> &'static str {
        "row"
    }

    fn parse(&self, text: &str) -> Vec<Record> {
        RowParser::parse(self, text)
    }
}

/// The flattened-table grammar, see [`parse_block`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockGrammar;

impl GrammarStrategy for BlockGrammar {
    fn name(&self) -> &'static str {
        "block"
    }

    fn parse(&self, text: &str) -> Vec<Record> {
        parse_block(text)
    }
}

/// Result of running the chain over one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The text had no tokens at all.
    EmptyInput,
    /// The text had tokens but no grammar matched.
    Unrecognized,
    /// A grammar recovered records.
    Parsed {
        /// Name of the grammar that matched.
        grammar: &'static str,
        /// The recovered records, never empty.
        records: Vec<Record>,
    },
}

impl ParseOutcome {
    /// The recovered records, empty unless parsed.
    pub fn records(&self) -> &[Record] {
        match self {
            ParseOutcome::Parsed { records, .. } => records,
            _ => &[],
        }
    }

    /// Consumes the outcome, returning its records.
    pub fn into_records(self) -> Vec<Record> {
        match self {
            ParseOutcome::Parsed { records, .. } => records,
            _ => Vec::new(),
        }
    }
}

/// Grammars tried in order until one yields records.
///
/// # Example
///
/// ```
/// use damage_ledger::parsing::{ParseOutcome, ParserChain};
///
/// let chain = ParserChain::new();
///
/// match chain.parse("3 A 4 B RD ID Regulierer Sachverständiger") {
///     ParseOutcome::Parsed { grammar, records } => {
///         assert_eq!(grammar, "block");
///         assert_eq!(records.len(), 2);
///     }
///     other => panic!("unexpected outcome: {:?}", other),
/// }
///
/// assert_eq!(chain.parse("  "), ParseOutcome::EmptyInput);
/// assert_eq!(chain.parse("Seite 1 von 2"), ParseOutcome::Unrecognized);
/// ```
pub struct ParserChain {
    strategies: Vec<Box<dyn GrammarStrategy>>,
}

impl ParserChain {
    /// The default chain: row grammar with the built-in pattern, then block.
    pub fn new() -> Self {
        Self::from_strategies(vec![Box::new(RowParser::new()), Box::new(BlockGrammar)])
    }

    /// The default chain with an optional custom row pattern.
    pub fn with_row_pattern(pattern: Option<&str>) -> LedgerResult<Self> {
        let row = match pattern {
            Some(pattern) => RowParser::with_pattern(pattern)?,
            None => RowParser::new(),
        };
        Ok(Self::from_strategies(vec![Box::new(row), Box::new(BlockGrammar)]))
    }

    /// A chain with an explicit grammar order.
    pub fn from_strategies(strategies: Vec<Box<dyn GrammarStrategy>>) -> Self {
        Self { strategies }
    }

    /// Names of the grammars in the order they are tried.
    pub fn grammar_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Runs the grammars over one text.
    pub fn parse(&self, text: &str) -> ParseOutcome {
        if tokenize(text).is_empty() {
            return ParseOutcome::EmptyInput;
        }

        for strategy in &self.strategies {
            let records = strategy.parse(text);
            if !records.is_empty() {
                debug!(
                    grammar = strategy.name(),
                    records = records.len(),
                    "Grammar matched"
                );
                return ParseOutcome::Parsed {
                    grammar: strategy.name(),
                    records,
                };
            }
        }

        debug!(grammars = ?self.grammar_names(), "No grammar matched");
        ParseOutcome::Unrecognized
    }
}

impl Default for ParserChain {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ParserChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserChain")
            .field("strategies", &self.grammar_names())
            .finish()
    }
}
