//! Configuration loading for the damage ledger.
//!
//! This module loads the ledger configuration from a YAML file: the default
//! damage types, target reduction rules and an optional custom row grammar.
//!
//! # Example
//!
//! ```no_run
//! use damage_ledger::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/ledger.yaml").unwrap();
//! println!("Default types: {:?}", config.config().default_types);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{LedgerConfig, ParserConfig};
