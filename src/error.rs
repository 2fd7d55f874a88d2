//! Error types for the damage ledger.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the ledger can report. Parsing never fails: unmatched
//! input simply yields no records, so parser errors only arise when a custom
//! grammar is configured.

use thiserror::Error;

/// The main error type for the damage ledger.
///
/// # Example
///
/// ```
/// use damage_ledger::error::LedgerError;
///
/// let error = LedgerError::EmployeeNotFound {
///     name: "MMueller".to_string(),
/// };
/// assert_eq!(error.to_string(), "Employee not found: MMueller");
/// ```
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or contained invalid values.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A row grammar pattern did not compile or lacks required captures.
    #[error("Invalid row pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why the pattern was rejected.
        message: String,
    },

    /// An employee name was rejected.
    #[error("Invalid employee '{name}': {message}")]
    InvalidEmployee {
        /// The rejected name.
        name: String,
        /// Why the name was rejected.
        message: String,
    },

    /// An employee with this name already exists.
    #[error("Employee already exists: {name}")]
    DuplicateEmployee {
        /// The duplicated name.
        name: String,
    },

    /// The employee is not present in the ledger.
    #[error("Employee not found: {name}")]
    EmployeeNotFound {
        /// The missing name.
        name: String,
    },

    /// A damage-type label was rejected.
    #[error("Invalid damage type '{label}': {message}")]
    InvalidDamageType {
        /// The rejected label.
        label: String,
        /// Why the label was rejected.
        message: String,
    },

    /// A persisted state payload could not be imported at all.
    #[error("State import failed: {message}")]
    StateImport {
        /// A description of the failure.
        message: String,
    },

    /// Writing an export failed.
    #[error("Export failed: {message}")]
    Export {
        /// A description of the failure.
        message: String,
    },
}

/// A type alias for Results that return LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;
