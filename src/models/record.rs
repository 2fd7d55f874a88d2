//! Parsed record model.
//!
//! A [`Record`] is one `(count, employee, damage type)` triple recovered from
//! OCR text. Records are transient: they are created by a parser and consumed
//! by a single booking operation.

use serde::Serialize;

/// A single count attributed to an employee, optionally for a damage type.
///
/// Fields are private so a record cannot be altered after it was parsed.
///
/// # Example
///
/// ```
/// use damage_ledger::models::Record;
///
/// let record = Record::new(316, "JHackenbroich", Some("Regulierer")).unwrap();
/// assert_eq!(record.count(), 316);
/// assert_eq!(record.employee(), "JHackenbroich");
/// assert_eq!(record.damage_type(), Some("Regulierer"));
///
/// assert!(Record::new(1, "   ", None).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    count: u64,
    employee: String,
    damage_type: Option<String>,
}

impl Record {
    /// Creates a record, trimming the employee and type.
    ///
    /// Returns `None` when the employee is empty. An empty damage type is
    /// treated as absent.
    pub fn new(count: u64, employee: &str, damage_type: Option<&str>) -> Option<Self> {
        let employee = employee.trim();
        if employee.is_empty() {
            return None;
        }

        let damage_type = damage_type
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Some(Self {
            count,
            employee: employee.to_string(),
            damage_type,
        })
    }

    /// The number of handled cases.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// The employee the count belongs to.
    pub fn employee(&self) -> &str {
        &self.employee
    }

    /// The damage type, if the grammar supplied one.
    pub fn damage_type(&self) -> Option<&str> {
        self.damage_type.as_deref()
    }
}
