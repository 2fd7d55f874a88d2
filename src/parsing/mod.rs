//! Text grammars that turn OCR output into records.
//!
//! This module contains the tokenizer, the row grammar, the header boundary
//! detector and block grammar for flattened tables, and the ordered chain
//! that tries the grammars in turn.

mod block_parser;
mod header_boundary;
mod row_parser;
mod strategy;
mod tokenizer;

pub use block_parser::parse_block;
pub use header_boundary::find_header_boundary;
pub use row_parser::{DEFAULT_ROW_PATTERN, RowParser};
pub use strategy::{BlockGrammar, GrammarStrategy, ParseOutcome, ParserChain};
pub use tokenizer::{normalize_separators, tokenize};
