//! Ledger and known-type registry models.
//!
//! The [`Ledger`] holds the running totals per employee and the subtotals per
//! employee and damage type. The [`KnownTypes`] registry is the ordered set of
//! damage-type labels the ledger has seen or was seeded with.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Orders employee names case-insensitively, falling back to the exact
/// string so the order is total.
///
/// # Example
///
/// ```
/// use damage_ledger::models::compare_names;
///
/// let mut names = vec!["mmueller", "JHackenbroich", "Cgrothe"];
/// names.sort_by(|a, b| compare_names(a, b));
/// assert_eq!(names, vec!["Cgrothe", "JHackenbroich", "mmueller"]);
/// ```
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Running totals and per-type subtotals for every employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    totals: BTreeMap<String, u64>,
    by_type: BTreeMap<String, BTreeMap<String, u64>>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from persisted maps.
    ///
    /// Employees that only appear in `by_type` get a total of zero so every
    /// employee is listed in both maps.
    pub fn from_parts(
        mut totals: BTreeMap<String, u64>,
        mut by_type: BTreeMap<String, BTreeMap<String, u64>>,
    ) -> Self {
        for name in by_type.keys() {
            totals.entry(name.clone()).or_insert(0);
        }
        for name in totals.keys() {
            by_type.entry(name.clone()).or_default();
        }
        Self { totals, by_type }
    }

    /// Total count per employee.
    pub fn totals(&self) -> &BTreeMap<String, u64> {
        &self.totals
    }

    /// Subtotals per employee and damage type.
    pub fn by_type(&self) -> &BTreeMap<String, BTreeMap<String, u64>> {
        &self.by_type
    }

    /// Returns true if the employee has an entry.
    pub fn contains(&self, employee: &str) -> bool {
        self.totals.contains_key(employee)
    }

    /// Returns true if no employee is recorded.
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// All employees in case-insensitive name order.
    pub fn employees(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.totals.keys().map(String::as_str).collect();
        names.sort_by(|a, b| compare_names(a, b));
        names
    }

    /// The employee's total, zero when unknown.
    pub fn total(&self, employee: &str) -> u64 {
        self.totals.get(employee).copied().unwrap_or(0)
    }

    /// The employee's subtotal for a damage type, zero when unknown.
    pub fn count(&self, employee: &str, damage_type: &str) -> u64 {
        self.by_type
            .get(employee)
            .and_then(|types| types.get(damage_type))
            .copied()
            .unwrap_or(0)
    }

    /// Every damage type present in any employee's breakdown.
    pub fn observed_types(&self) -> BTreeSet<&str> {
        self.by_type
            .values()
            .flat_map(|types| types.keys().map(String::as_str))
            .collect()
    }

    /// Adds to the employee's total and, if given, to the type subtotal.
    pub(crate) fn add(&mut self, employee: &str, count: u64, damage_type: Option<&str>) {
        let total = self.totals.entry(employee.to_string()).or_insert(0);
        *total = total.saturating_add(count);

        let types = self.by_type.entry(employee.to_string()).or_default();
        if let Some(damage_type) = damage_type {
            let subtotal = types.entry(damage_type.to_string()).or_insert(0);
            *subtotal = subtotal.saturating_add(count);
        }
    }

    /// Subtracts from the total and, if given, the type subtotal, clamping
    /// both at zero. Returns the amounts actually removed.
    pub(crate) fn subtract(
        &mut self,
        employee: &str,
        count: u64,
        damage_type: Option<&str>,
    ) -> (u64, u64) {
        let removed_total = match self.totals.get_mut(employee) {
            Some(total) => {
                let removed = count.min(*total);
                *total -= removed;
                removed
            }
            None => 0,
        };

        let removed_type = match (damage_type, self.by_type.get_mut(employee)) {
            (Some(damage_type), Some(types)) => match types.get_mut(damage_type) {
                Some(subtotal) => {
                    let removed = count.min(*subtotal);
                    *subtotal -= removed;
                    removed
                }
                None => 0,
            },
            _ => 0,
        };

        (removed_total, removed_type)
    }

    /// Overwrites the employee's total and full breakdown.
    pub(crate) fn set(&mut self, employee: &str, total: u64, by_type: BTreeMap<String, u64>) {
        self.totals.insert(employee.to_string(), total);
        self.by_type.insert(employee.to_string(), by_type);
    }

    /// Inserts an employee with a zero total. Returns false if present.
    pub(crate) fn insert_employee(&mut self, employee: &str) -> bool {
        if self.contains(employee) {
            return false;
        }
        self.set(employee, 0, BTreeMap::new());
        true
    }

    /// Removes the employee entirely. Returns false if absent.
    pub(crate) fn remove(&mut self, employee: &str) -> bool {
        self.by_type.remove(employee);
        self.totals.remove(employee).is_some()
    }
}

/// Ordered set of damage-type labels.
///
/// Insertion order is preserved; duplicates are ignored.
///
/// # Example
///
/// ```
/// use damage_ledger::models::KnownTypes;
///
/// let mut types = KnownTypes::new(["Regulierer", "Sachverständiger"]);
/// assert!(types.register("Gutachter"));
/// assert!(!types.register("Regulierer"));
/// assert_eq!(types.as_slice(), ["Regulierer", "Sachverständiger", "Gutachter"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnownTypes(Vec<String>);

impl KnownTypes {
    /// Creates a registry from labels, dropping blanks and duplicates.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut types = Self::default();
        for label in labels {
            types.register(label.as_ref());
        }
        types
    }

    /// Adds a label if it is new. Returns true when it was added.
    pub fn register(&mut self, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() || self.contains(label) {
            return false;
        }
        self.0.push(label.to_string());
        true
    }

    /// Returns true if the label is registered.
    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|known| known == label)
    }

    /// The labels in registration order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterates over the labels in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of registered labels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
