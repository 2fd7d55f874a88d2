//! Round-robin assignment of new work per damage type.
//!
//! Employees below their target for a type are served in case-insensitive
//! name order. When everyone has reached target a new round starts over the
//! whole team at index 0.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Ledger;

use super::targets::TargetModel;

/// Next round-robin index per damage type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RotationState(BTreeMap<String, usize>);

impl RotationState {
    /// Creates an empty state; every type starts at index 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a persisted state.
    pub fn from_map(indices: BTreeMap<String, usize>) -> Self {
        Self(indices)
    }

    /// The persisted indices.
    pub fn as_map(&self) -> &BTreeMap<String, usize> {
        &self.0
    }

    /// The stored index for a type.
    pub fn index(&self, damage_type: &str) -> usize {
        self.0.get(damage_type).copied().unwrap_or(0)
    }
}

/// Employees whose subtotal for the type is below their target, in name
/// order.
///
/// # Example
///
/// ```
/// use damage_ledger::ledger::{LedgerStore, active_employees};
/// use damage_ledger::models::Record;
///
/// let mut store = LedgerStore::default();
/// store.book(&[
///     Record::new(5, "B", Some("X")).unwrap(),
///     Record::new(1, "a", Some("X")).unwrap(),
///     Record::new(2, "C", Some("X")).unwrap(),
/// ]);
///
/// let targets = store.targets();
/// assert_eq!(active_employees(store.ledger(), &targets, "X"), vec!["a", "C"]);
/// ```
pub fn active_employees<'a>(
    ledger: &'a Ledger,
    targets: &TargetModel,
    damage_type: &str,
) -> Vec<&'a str> {
    ledger
        .employees()
        .into_iter()
        .filter(|employee| {
            ledger.count(employee, damage_type) < targets.target(employee, damage_type)
        })
        .collect()
}

/// Picks the employee at the current index and computes the following index.
fn select(
    ledger: &Ledger,
    targets: &TargetModel,
    state: &RotationState,
    damage_type: &str,
) -> Option<(String, usize)> {
    let active = active_employees(ledger, targets, damage_type);

    let (candidates, index) = if active.is_empty() {
        (ledger.employees(), 0)
    } else {
        (active, state.index(damage_type))
    };

    if candidates.is_empty() {
        return None;
    }

    let index = if index >= candidates.len() { 0 } else { index };
    let next = (index + 1) % candidates.len();

    Some((candidates[index].to_string(), next))
}

/// Returns the next employee for the type and advances the rotation.
///
/// Every call advances the stored index; use [`peek_assignment`] for a
/// read-only view. Returns `None` (leaving the state untouched) when the
/// ledger has no employees.
pub fn next_assignment(
    ledger: &Ledger,
    targets: &TargetModel,
    state: &mut RotationState,
    damage_type: &str,
) -> Option<String> {
    let (employee, next) = select(ledger, targets, state, damage_type)?;

    if active_employees(ledger, targets, damage_type).is_empty() {
        debug!(damage_type, "All employees at target, starting new round");
    }

    state.0.insert(damage_type.to_string(), next);
    debug!(damage_type, employee = %employee, next_index = next, "Rotation advanced");

    Some(employee)
}

/// Returns who [`next_assignment`] would pick, without advancing.
pub fn peek_assignment(
    ledger: &Ledger,
    targets: &TargetModel,
    state: &RotationState,
    damage_type: &str,
) -> Option<String> {
    select(ledger, targets, state, damage_type).map(|(employee, _)| employee)
}
