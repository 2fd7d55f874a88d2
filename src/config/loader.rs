//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the ledger
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::LedgerStore;
use crate::parsing::{ParserChain, RowParser};

use super::types::LedgerConfig;

/// Loads and validates ledger configuration.
///
/// # File Layout
///
/// ```text
/// default_types:
///   - Regulierer
///   - Sachverständiger
/// targets:
///   reductions:
///     - employee: cgrothe
///       factor: "0.75"
/// parser:
///   row_pattern: null
/// ```
///
/// # Example
///
/// ```no_run
/// use damage_ledger::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/ledger.yaml")?;
/// let store = loader.store();
/// let chain = loader.parser_chain()?;
/// # Ok::<(), damage_ledger::error::LedgerError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: LedgerConfig,
}

impl ConfigLoader {
    /// Loads configuration from a YAML file.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - The file is missing (`ConfigNotFound`)
    /// - The file contains invalid YAML or invalid values (`ConfigParseError`)
    /// - The custom row pattern is invalid (`InvalidPattern`)
    pub fn load<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| LedgerError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::from_yaml_str(&content, &path_str)
    }

    /// Parses configuration from YAML text. `origin` names the source in
    /// error messages.
    pub fn from_yaml_str(content: &str, origin: &str) -> LedgerResult<Self> {
        let config: LedgerConfig =
            serde_yaml::from_str(content).map_err(|e| LedgerError::ConfigParseError {
                path: origin.to_string(),
                message: e.to_string(),
            })?;

        Self::validate(&config, origin)?;
        Ok(Self { config })
    }

    fn validate(config: &LedgerConfig, origin: &str) -> LedgerResult<()> {
        let invalid = |message: String| LedgerError::ConfigParseError {
            path: origin.to_string(),
            message,
        };

        if config.default_types.iter().any(|t| t.trim().is_empty()) {
            return Err(invalid("default_types must not contain blank labels".to_string()));
        }

        for rule in &config.targets.reductions {
            if rule.employee.trim().is_empty() {
                return Err(invalid("target reduction without employee".to_string()));
            }
            if rule.factor < Decimal::ZERO || rule.factor > Decimal::ONE {
                return Err(invalid(format!(
                    "target factor {} for '{}' must be between 0 and 1",
                    rule.factor, rule.employee
                )));
            }
        }

        if let Some(pattern) = &config.parser.row_pattern {
            RowParser::with_pattern(pattern)?;
        }

        Ok(())
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Builds the grammar chain described by the configuration.
    pub fn parser_chain(&self) -> LedgerResult<ParserChain> {
        ParserChain::with_row_pattern(self.config.parser.row_pattern.as_deref())
    }

    /// Creates an empty store seeded from the configuration.
    pub fn store(&self) -> LedgerStore {
        LedgerStore::from_config(&self.config)
    }
}
