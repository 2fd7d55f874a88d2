//! Core data models for the damage ledger.
//!
//! This module contains all the domain models used throughout the crate.

mod history;
mod ledger;
mod overview;
mod record;

pub use history::{LedgerEntry, LedgerOp};
pub use ledger::{KnownTypes, Ledger, compare_names};
pub use overview::{
    BookingOutcome, BookingReport, BookingSummary, EmployeeBooking, EmployeeOverview,
    LedgerOverview, TypeStanding,
};
pub use record::Record;
