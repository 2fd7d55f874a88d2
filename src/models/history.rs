//! Ledger history (audit trail) models.
//!
//! Every mutation of the ledger appends a [`LedgerEntry`]. Absolute overwrites
//! are recorded as [`LedgerOp::Set`] so a manual correction can always be told
//! apart from accumulated bookings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single ledger mutation.
///
/// Serialized with an `op` tag (`incr`, `decr`, `set`, `add`, `remove`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum LedgerOp {
    /// Counts added to an employee, optionally for one damage type.
    #[serde(rename = "incr")]
    Increment {
        /// The employee.
        name: String,
        /// The amount added.
        count: u64,
        /// The damage type, if any.
        #[serde(default, alias = "rdid")]
        damage_type: Option<String>,
    },
    /// Counts removed from an employee, clamped at zero.
    #[serde(rename = "decr")]
    Decrement {
        /// The employee.
        name: String,
        /// The amount the caller asked to remove.
        requested: u64,
        /// The amount actually removed from the total.
        removed: u64,
        /// The damage type, if any.
        #[serde(default, alias = "rdid")]
        damage_type: Option<String>,
    },
    /// Total and breakdown overwritten in one step.
    #[serde(rename = "set")]
    Set {
        /// The employee.
        name: String,
        /// The new total.
        total: u64,
        /// The new breakdown.
        #[serde(default)]
        by_type: BTreeMap<String, u64>,
    },
    /// Employee created with a zero total.
    #[serde(rename = "add")]
    AddEmployee {
        /// The employee.
        name: String,
    },
    /// Employee removed from the ledger.
    #[serde(rename = "remove")]
    Remove {
        /// The employee.
        name: String,
    },
}

impl LedgerOp {
    /// The employee this operation touched.
    pub fn employee(&self) -> &str {
        match self {
            LedgerOp::Increment { name, .. }
            | LedgerOp::Decrement { name, .. }
            | LedgerOp::Set { name, .. }
            | LedgerOp::AddEmployee { name }
            | LedgerOp::Remove { name } => name,
        }
    }

    /// Returns true for operations that bypass accumulation.
    pub fn is_absolute(&self) -> bool {
        matches!(self, LedgerOp::Set { .. })
    }
}

/// A timestamped history entry.
///
/// Entries imported from older state files may lack a timestamp.
///
/// # Example
///
/// ```
/// use damage_ledger::models::{LedgerEntry, LedgerOp};
///
/// let entry: LedgerEntry = serde_json::from_str(
///     r#"{"op":"incr","name":"MMueller","count":1,"rdid":"Regulierer"}"#,
/// ).unwrap();
/// assert!(entry.at.is_none());
/// assert_eq!(entry.op.employee(), "MMueller");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// When the mutation happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<DateTime<Utc>>,
    /// What happened.
    #[serde(flatten)]
    pub op: LedgerOp,
}

impl LedgerEntry {
    /// Creates an entry stamped with the current time.
    pub fn now(op: LedgerOp) -> Self {
        Self {
            at: Some(Utc::now()),
            op,
        }
    }
}
