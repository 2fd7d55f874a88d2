//! Fairness targets derived from peer performance.
//!
//! For each damage type the target is the highest subtotal any employee has
//! reached. Reduction rules lower the target for named employees (by default
//! `cgrothe` works to 75% of the maximum).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::models::Ledger;

/// The employee who receives the default target reduction.
pub const RESERVED_EMPLOYEE: &str = "cgrothe";

/// The default reduction factor (75%).
pub const DEFAULT_REDUCTION_FACTOR: Decimal = Decimal::from_parts(75, 0, 0, false, 2);

fn normalize_identifier(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A reduced target for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetReduction {
    /// Employee identifier, compared trimmed and case-insensitively.
    pub employee: String,
    /// Fraction of the maximum this employee is expected to reach.
    pub factor: Decimal,
}

impl TargetReduction {
    /// Returns true if the rule applies to the employee.
    pub fn matches(&self, employee: &str) -> bool {
        normalize_identifier(&self.employee) == normalize_identifier(employee)
    }
}

/// Rules that turn per-type maxima into per-employee targets.
///
/// # Example
///
/// ```
/// use damage_ledger::ledger::TargetPolicy;
///
/// let policy = TargetPolicy::default();
/// assert_eq!(policy.target_for(" CGrothe ", 100), 75);
/// assert_eq!(policy.target_for("MMueller", 100), 100);
/// assert_eq!(policy.target_for("cgrothe", 3), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPolicy {
    /// Reduction rules; the first matching rule applies.
    #[serde(default)]
    pub reductions: Vec<TargetReduction>,
}

impl TargetPolicy {
    /// A policy without reductions: every target equals the maximum.
    pub fn none() -> Self {
        Self {
            reductions: Vec::new(),
        }
    }

    /// The rule that applies to an employee, if any.
    pub fn reduction_for(&self, employee: &str) -> Option<&TargetReduction> {
        self.reductions.iter().find(|rule| rule.matches(employee))
    }

    /// The employee's target for a type whose maximum is `maximum`.
    pub fn target_for(&self, employee: &str, maximum: u64) -> u64 {
        match self.reduction_for(employee) {
            Some(rule) => (Decimal::from(maximum) * rule.factor)
                .floor()
                .to_u64()
                .unwrap_or(maximum),
            None => maximum,
        }
    }
}

impl Default for TargetPolicy {
    fn default() -> Self {
        Self {
            reductions: vec![TargetReduction {
                employee: RESERVED_EMPLOYEE.to_string(),
                factor: DEFAULT_REDUCTION_FACTOR,
            }],
        }
    }
}

/// Per-type maxima and per-employee targets.
///
/// A pure function of the ledger and the policy; recompute it on every read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetModel {
    maxima: BTreeMap<String, u64>,
    targets: BTreeMap<String, BTreeMap<String, u64>>,
}

impl TargetModel {
    /// Maximum subtotal per damage type.
    pub fn maxima(&self) -> &BTreeMap<String, u64> {
        &self.maxima
    }

    /// Target per employee and damage type.
    pub fn targets(&self) -> &BTreeMap<String, BTreeMap<String, u64>> {
        &self.targets
    }

    /// The maximum for a type, zero when no employee has it.
    pub fn maximum(&self, damage_type: &str) -> u64 {
        self.maxima.get(damage_type).copied().unwrap_or(0)
    }

    /// The employee's target for a type, zero when either is unknown.
    pub fn target(&self, employee: &str, damage_type: &str) -> u64 {
        self.targets
            .get(employee)
            .and_then(|types| types.get(damage_type))
            .copied()
            .unwrap_or(0)
    }
}

/// Computes maxima and targets from the ledger.
///
/// Every employee gets a target for every type present anywhere in the
/// ledger, including types they have never handled.
///
/// # Example
///
/// ```
/// use damage_ledger::ledger::{LedgerStore, TargetPolicy, compute_targets};
/// use damage_ledger::models::Record;
///
/// let mut store = LedgerStore::default();
/// store.book(&[
///     Record::new(100, "MMueller", Some("Regulierer")).unwrap(),
///     Record::new(40, "cgrothe", Some("Regulierer")).unwrap(),
/// ]);
///
/// let model = compute_targets(store.ledger(), &TargetPolicy::default());
/// assert_eq!(model.maximum("Regulierer"), 100);
/// assert_eq!(model.target("cgrothe", "Regulierer"), 75);
/// assert_eq!(model.target("MMueller", "Regulierer"), 100);
/// ```
pub fn compute_targets(ledger: &Ledger, policy: &TargetPolicy) -> TargetModel {
    let mut maxima: BTreeMap<String, u64> = BTreeMap::new();
    for types in ledger.by_type().values() {
        for (damage_type, &count) in types {
            let max = maxima.entry(damage_type.clone()).or_insert(0);
            *max = (*max).max(count);
        }
    }

    let targets = ledger
        .totals()
        .keys()
        .map(|employee| {
            let row = maxima
                .iter()
                .map(|(damage_type, &max)| {
                    (damage_type.clone(), policy.target_for(employee, max))
                })
                .collect();
            (employee.clone(), row)
        })
        .collect();

    TargetModel { maxima, targets }
}
