//! Damage ledger for claim handling teams
//!
//! This crate turns OCR output of damage-count reports into a per-employee
//! ledger, derives per-type workload targets from it and schedules the next
//! assignee of each damage type with a target-aware rotation.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod parsing;
