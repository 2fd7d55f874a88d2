//! Flat CSV projections of the ledger.
//!
//! Two tables are exported: totals per employee and counts per employee and
//! damage type. Rows follow the ledger's case-insensitive name order so the
//! output is deterministic.

use std::io::Write;

use chrono::{DateTime, TimeZone};

use crate::error::{LedgerError, LedgerResult};
use crate::models::Ledger;

/// Header of the totals table.
pub const TOTALS_HEADER: [&str; 2] = ["name", "total"];

/// Header of the per-type table.
pub const BY_TYPE_HEADER: [&str; 3] = ["name", "rd_id", "count"];

fn export_error(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Export {
        message: e.to_string(),
    }
}

/// Writes the `(name, total)` table.
pub fn write_totals_csv(ledger: &Ledger, writer: impl Write) -> LedgerResult<()> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(TOTALS_HEADER).map_err(export_error)?;
    for name in ledger.employees() {
        let total = ledger.total(name).to_string();
        csv.write_record([name, total.as_str()])
            .map_err(export_error)?;
    }

    csv.flush().map_err(export_error)?;
    Ok(())
}

/// Writes the `(name, rd_id, count)` table.
pub fn write_by_type_csv(ledger: &Ledger, writer: impl Write) -> LedgerResult<()> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(BY_TYPE_HEADER).map_err(export_error)?;
    for name in ledger.employees() {
        let Some(types) = ledger.by_type().get(name) else {
            continue;
        };
        for (damage_type, count) in types {
            let count = count.to_string();
            csv.write_record([name, damage_type.as_str(), count.as_str()])
                .map_err(export_error)?;
        }
    }

    csv.flush().map_err(export_error)?;
    Ok(())
}

/// Renders the totals table to a string.
///
/// # Example
///
/// ```
/// use damage_ledger::ledger::{LedgerStore, totals_csv};
///
/// let mut store = LedgerStore::default();
/// store.increment("MMueller", 3, Some("Regulierer")).unwrap();
///
/// assert_eq!(totals_csv(store.ledger()).unwrap(), "name,total\nMMueller,3\n");
/// ```
pub fn totals_csv(ledger: &Ledger) -> LedgerResult<String> {
    let mut buffer = Vec::new();
    write_totals_csv(ledger, &mut buffer)?;
    String::from_utf8(buffer).map_err(export_error)
}

/// Renders the per-type table to a string.
pub fn by_type_csv(ledger: &Ledger) -> LedgerResult<String> {
    let mut buffer = Vec::new();
    write_by_type_csv(ledger, &mut buffer)?;
    String::from_utf8(buffer).map_err(export_error)
}

/// Builds a timestamped export file name such as
/// `totals_20261017_093000.csv`.
pub fn export_file_name<Tz: TimeZone>(prefix: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}.csv", prefix, at.format("%Y%m%d_%H%M%S"))
}
