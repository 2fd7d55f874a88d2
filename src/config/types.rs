//! Configuration types for the damage ledger.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file.

use serde::{Deserialize, Serialize};

use crate::ledger::{DEFAULT_DAMAGE_TYPES, TargetPolicy};

/// Grammar settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Custom row pattern with `count`, `employee` and optional
    /// `damage_type` named captures. The built-in pattern is used when unset.
    #[serde(default)]
    pub row_pattern: Option<String>,
}

/// The complete ledger configuration.
///
/// Every section is optional in the file; missing sections take the values
/// of [`LedgerConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Damage types a fresh or reset registry starts with.
    #[serde(default = "default_types")]
    pub default_types: Vec<String>,
    /// Target reduction rules.
    #[serde(default)]
    pub targets: TargetPolicy,
    /// Grammar settings.
    #[serde(default)]
    pub parser: ParserConfig,
}

fn default_types() -> Vec<String> {
    DEFAULT_DAMAGE_TYPES.iter().map(|t| t.to_string()).collect()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_types: default_types(),
            targets: TargetPolicy::default(),
            parser: ParserConfig::default(),
        }
    }
}
