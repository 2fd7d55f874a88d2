//! Aggregation, targets and rotation over booked records.
//!
//! This module contains the [`LedgerStore`] that owns all long-lived state,
//! the target model derived from peer maxima, the per-type rotation
//! scheduler, and the JSON and CSV projections used for persistence and
//! reporting.

mod export;
mod persistence;
mod rotation;
mod store;
mod targets;

pub use export::{
    BY_TYPE_HEADER, TOTALS_HEADER, by_type_csv, export_file_name, totals_csv, write_by_type_csv,
    write_totals_csv,
};
pub use persistence::{ImportReport, PersistedState, export_json, import_json, import_value, snapshot};
pub use rotation::{RotationState, active_employees, next_assignment, peek_assignment};
pub use store::{DEFAULT_DAMAGE_TYPES, LedgerStore};
pub use targets::{
    DEFAULT_REDUCTION_FACTOR, RESERVED_EMPLOYEE, TargetModel, TargetPolicy, TargetReduction,
    compute_targets,
};
