//! Booking results and display projections.
//!
//! These types are derived values: they are computed fresh from the ledger
//! and never stored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What one employee received in a booking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeBooking {
    /// Sum of all booked counts.
    pub total: u64,
    /// Booked counts per damage type.
    pub types: BTreeMap<String, u64>,
}

/// Aggregate of one booking batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSummary {
    /// Number of records booked.
    pub records: usize,
    /// Damage types that were registered by this batch.
    pub new_types: Vec<String>,
    /// Per-employee amounts.
    pub employees: BTreeMap<String, EmployeeBooking>,
}

/// Result of booking a batch of OCR texts.
///
/// `EmptyInput` and `NoRecords` are kept apart so a caller can tell "nothing
/// was recognized by OCR" from "OCR produced text that no grammar matched".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BookingOutcome {
    /// Every text was empty.
    EmptyInput,
    /// Text was present but no grammar recovered a record.
    NoRecords,
    /// Records were booked.
    Booked(BookingSummary),
}

/// Booking outcome together with per-image bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingReport {
    /// Number of texts submitted.
    pub images: usize,
    /// Texts skipped because recognition produced nothing.
    pub skipped: usize,
    /// Names of the grammars that matched, one per parsed image.
    pub grammars: Vec<String>,
    /// What was booked.
    pub outcome: BookingOutcome,
}

/// One damage type as seen by one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeStanding {
    /// The damage type.
    pub damage_type: String,
    /// Current subtotal (ist).
    pub count: u64,
    /// Target for this employee (ziel).
    pub target: u64,
    /// `count - target`; negative while below target.
    pub delta: i64,
}

/// Display row for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeOverview {
    /// The employee.
    pub name: String,
    /// Current total.
    pub total: u64,
    /// Per-type standing, one entry per target type.
    pub standings: Vec<TypeStanding>,
}

/// Full display projection of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerOverview {
    /// Employees in case-insensitive name order.
    pub employees: Vec<EmployeeOverview>,
    /// Maximum subtotal per damage type.
    pub maxima: BTreeMap<String, u64>,
    /// Who would receive the next unit of each known type.
    pub next_assignments: BTreeMap<String, Option<String>>,
    /// Registered damage types.
    pub known_types: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_tagged_by_status() {
        let json = serde_json::to_value(BookingOutcome::NoRecords).unwrap();
        assert_eq!(json, serde_json::json!({"status": "no_records"}));

        let json = serde_json::to_value(BookingOutcome::Booked(BookingSummary::default())).unwrap();
        assert_eq!(json["status"], "booked");
        assert_eq!(json["records"], 0);
    }
}
