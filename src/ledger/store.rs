//! The owned ledger state and every operation that mutates it.
//!
//! A [`LedgerStore`] bundles the ledger, the known-type registry, the
//! rotation state and the history. It is passed explicitly to whoever needs
//! it; callers that share it across threads must wrap it in a single mutex,
//! since each operation reads and then writes.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    BookingOutcome, BookingReport, BookingSummary, EmployeeOverview, KnownTypes, Ledger,
    LedgerEntry, LedgerOp, LedgerOverview, Record, TypeStanding,
};
use crate::parsing::{ParseOutcome, ParserChain};

use super::rotation::{RotationState, next_assignment, peek_assignment};
use super::targets::{TargetModel, TargetPolicy, compute_targets};

/// The damage types every fresh ledger knows.
pub const DEFAULT_DAMAGE_TYPES: [&str; 2] = ["Regulierer", "Sachverständiger"];

fn clean_employee(name: &str) -> LedgerResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidEmployee {
            name: name.to_string(),
            message: "name must not be empty".to_string(),
        });
    }
    Ok(trimmed)
}

/// `count - target` as a signed value, saturating at the `i64` bounds.
fn signed_delta(count: u64, target: u64) -> i64 {
    let delta = i128::from(count) - i128::from(target);
    i64::try_from(delta).unwrap_or(if delta < 0 { i64::MIN } else { i64::MAX })
}

fn clean_type(damage_type: Option<&str>) -> Option<&str> {
    damage_type.map(str::trim).filter(|t| !t.is_empty())
}

/// Long-lived ledger state.
///
/// # Example
///
/// ```
/// use damage_ledger::ledger::LedgerStore;
/// use damage_ledger::parsing::ParserChain;
/// use damage_ledger::models::BookingOutcome;
///
/// let mut store = LedgerStore::default();
/// let chain = ParserChain::new();
///
/// let report = store.book_texts(&["316 JHackenbroich Regulierer", ""], &chain);
///
/// assert_eq!(report.skipped, 1);
/// assert!(matches!(report.outcome, BookingOutcome::Booked(_)));
/// assert_eq!(store.ledger().total("JHackenbroich"), 316);
/// ```
#[derive(Debug, Clone)]
pub struct LedgerStore {
    ledger: Ledger,
    known_types: KnownTypes,
    default_types: KnownTypes,
    rotation: RotationState,
    history: Vec<LedgerEntry>,
    policy: TargetPolicy,
}

impl LedgerStore {
    /// Creates an empty store seeded with the given default types.
    pub fn new(default_types: KnownTypes, policy: TargetPolicy) -> Self {
        Self {
            ledger: Ledger::new(),
            known_types: default_types.clone(),
            default_types,
            rotation: RotationState::new(),
            history: Vec::new(),
            policy,
        }
    }

    /// Creates an empty store from loaded configuration.
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(
            KnownTypes::new(&config.default_types),
            config.targets.clone(),
        )
    }

    /// The current ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The known-type registry.
    pub fn known_types(&self) -> &KnownTypes {
        &self.known_types
    }

    /// The types a reset restores.
    pub fn default_types(&self) -> &KnownTypes {
        &self.default_types
    }

    /// The rotation indices.
    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    /// The audit trail, oldest first.
    pub fn history(&self) -> &[LedgerEntry] {
        &self.history
    }

    /// The target policy.
    pub fn policy(&self) -> &TargetPolicy {
        &self.policy
    }

    fn record(&mut self, op: LedgerOp) {
        self.history.push(LedgerEntry::now(op));
    }

    fn apply_increment(&mut self, employee: &str, count: u64, damage_type: Option<&str>) -> bool {
        self.ledger.add(employee, count, damage_type);
        let registered = damage_type.is_some_and(|t| self.known_types.register(t));
        self.record(LedgerOp::Increment {
            name: employee.to_string(),
            count,
            damage_type: damage_type.map(str::to_string),
        });
        registered
    }

    /// Books a batch of parsed records.
    ///
    /// Each record adds to its employee's total and, with a type, to the
    /// type subtotal. Order within the batch does not matter; booking the
    /// same batch twice counts it twice.
    pub fn book(&mut self, records: &[Record]) -> BookingSummary {
        let mut summary = BookingSummary {
            records: records.len(),
            ..BookingSummary::default()
        };

        for record in records {
            let damage_type = record.damage_type();
            if self.apply_increment(record.employee(), record.count(), damage_type) {
                if let Some(damage_type) = damage_type {
                    summary.new_types.push(damage_type.to_string());
                }
            }

            let booked = summary
                .employees
                .entry(record.employee().to_string())
                .or_default();
            booked.total = booked.total.saturating_add(record.count());
            if let Some(damage_type) = damage_type {
                let booked_type = booked.types.entry(damage_type.to_string()).or_insert(0);
                *booked_type = booked_type.saturating_add(record.count());
            }
        }

        info!(
            records = summary.records,
            employees = summary.employees.len(),
            new_types = ?summary.new_types,
            "Booked records"
        );

        summary
    }

    /// Parses and books one OCR text per image.
    ///
    /// An empty text means recognition failed for that image; it is skipped
    /// and the remaining images are still processed.
    pub fn book_texts<S: AsRef<str>>(&mut self, texts: &[S], chain: &ParserChain) -> BookingReport {
        let mut skipped = 0;
        let mut saw_text = false;
        let mut grammars = Vec::new();
        let mut records = Vec::new();

        for (image, text) in texts.iter().enumerate() {
            match chain.parse(text.as_ref()) {
                ParseOutcome::EmptyInput => {
                    skipped += 1;
                    warn!(image, "No text recognized, skipping image");
                }
                ParseOutcome::Unrecognized => {
                    saw_text = true;
                    warn!(image, "No grammar matched recognized text");
                }
                ParseOutcome::Parsed {
                    grammar,
                    records: parsed,
                } => {
                    saw_text = true;
                    debug!(image, grammar, records = parsed.len(), "Parsed image text");
                    grammars.push(grammar.to_string());
                    records.extend(parsed);
                }
            }
        }

        let outcome = if !records.is_empty() {
            BookingOutcome::Booked(self.book(&records))
        } else if saw_text {
            BookingOutcome::NoRecords
        } else {
            BookingOutcome::EmptyInput
        };

        BookingReport {
            images: texts.len(),
            skipped,
            grammars,
            outcome,
        }
    }

    /// Adds to an employee's total and, optionally, one type subtotal.
    pub fn increment(
        &mut self,
        employee: &str,
        count: u64,
        damage_type: Option<&str>,
    ) -> LedgerResult<()> {
        let employee = clean_employee(employee)?;
        self.apply_increment(employee, count, clean_type(damage_type));
        debug!(employee, count, damage_type = ?damage_type, "Incremented");
        Ok(())
    }

    /// Removes from an employee's total and, optionally, one type subtotal.
    ///
    /// Both values are clamped at zero. Returns the amount actually removed
    /// from the total.
    pub fn decrement(
        &mut self,
        employee: &str,
        count: u64,
        damage_type: Option<&str>,
    ) -> LedgerResult<u64> {
        let employee = clean_employee(employee)?;
        if !self.ledger.contains(employee) {
            return Err(LedgerError::EmployeeNotFound {
                name: employee.to_string(),
            });
        }

        let damage_type = clean_type(damage_type);
        let (removed, _) = self.ledger.subtract(employee, count, damage_type);
        self.record(LedgerOp::Decrement {
            name: employee.to_string(),
            requested: count,
            removed,
            damage_type: damage_type.map(str::to_string),
        });
        debug!(employee, requested = count, removed, "Decremented");

        Ok(removed)
    }

    /// Overwrites an employee's total and full breakdown.
    ///
    /// This is a manual correction: it bypasses accumulation and is recorded
    /// as a `set` entry in the history.
    pub fn set_absolute(
        &mut self,
        employee: &str,
        total: u64,
        by_type: BTreeMap<String, u64>,
    ) -> LedgerResult<()> {
        let employee = clean_employee(employee)?;

        let mut cleaned = BTreeMap::new();
        for (label, count) in by_type {
            let trimmed = label.trim();
            if trimmed.is_empty() {
                return Err(LedgerError::InvalidDamageType {
                    label,
                    message: "label must not be empty".to_string(),
                });
            }
            cleaned.insert(trimmed.to_string(), count);
        }

        for label in cleaned.keys() {
            self.known_types.register(label);
        }
        self.ledger.set(employee, total, cleaned.clone());
        self.record(LedgerOp::Set {
            name: employee.to_string(),
            total,
            by_type: cleaned,
        });
        info!(employee, total, "Set absolute total");

        Ok(())
    }

    /// Adds an employee with a zero total. Returns the stored name.
    pub fn add_employee(&mut self, name: &str) -> LedgerResult<String> {
        let name = clean_employee(name)?;
        if !self.ledger.insert_employee(name) {
            return Err(LedgerError::DuplicateEmployee {
                name: name.to_string(),
            });
        }
        self.record(LedgerOp::AddEmployee {
            name: name.to_string(),
        });
        info!(employee = name, "Added employee");
        Ok(name.to_string())
    }

    /// Removes an employee and their breakdown. History is kept.
    pub fn remove_employee(&mut self, name: &str) -> LedgerResult<()> {
        let name = name.trim();
        if !self.ledger.remove(name) {
            return Err(LedgerError::EmployeeNotFound {
                name: name.to_string(),
            });
        }
        self.record(LedgerOp::Remove {
            name: name.to_string(),
        });
        info!(employee = name, "Removed employee");
        Ok(())
    }

    /// Registers a damage type by hand. Returns true if it was new.
    pub fn add_known_type(&mut self, label: &str) -> LedgerResult<bool> {
        if label.trim().is_empty() {
            return Err(LedgerError::InvalidDamageType {
                label: label.to_string(),
                message: "label must not be empty".to_string(),
            });
        }
        Ok(self.known_types.register(label))
    }

    /// Restores the default types, keeping any type still in the ledger.
    pub fn reset_known_types(&mut self) {
        let mut types = self.default_types.clone();
        for label in self.ledger.observed_types() {
            types.register(label);
        }
        self.known_types = types;
    }

    /// Computes targets from the current ledger.
    pub fn targets(&self) -> TargetModel {
        compute_targets(&self.ledger, &self.policy)
    }

    /// Assigns the next unit of a type and advances its rotation.
    pub fn next_assignment(&mut self, damage_type: &str) -> Option<String> {
        let targets = self.targets();
        next_assignment(&self.ledger, &targets, &mut self.rotation, damage_type)
    }

    /// Advances the rotation of every known type once.
    pub fn advance_all(&mut self) -> BTreeMap<String, Option<String>> {
        let targets = self.targets();
        let types: Vec<String> = self.known_types.iter().map(str::to_string).collect();

        types
            .into_iter()
            .map(|damage_type| {
                let employee =
                    next_assignment(&self.ledger, &targets, &mut self.rotation, &damage_type);
                (damage_type, employee)
            })
            .collect()
    }

    /// Who would receive the next unit of each known type, without
    /// advancing any rotation.
    pub fn peek_assignments(&self) -> BTreeMap<String, Option<String>> {
        let targets = self.targets();
        self.known_types
            .iter()
            .map(|damage_type| {
                (
                    damage_type.to_string(),
                    peek_assignment(&self.ledger, &targets, &self.rotation, damage_type),
                )
            })
            .collect()
    }

    /// Builds the display projection of the ledger.
    pub fn overview(&self) -> LedgerOverview {
        let targets = self.targets();

        let employees = self
            .ledger
            .employees()
            .into_iter()
            .map(|name| {
                let standings = self
                    .known_types
                    .iter()
                    .map(|damage_type| {
                        let count = self.ledger.count(name, damage_type);
                        let target = targets.target(name, damage_type);
                        TypeStanding {
                            damage_type: damage_type.to_string(),
                            count,
                            target,
                            delta: signed_delta(count, target),
                        }
                    })
                    .collect();

                EmployeeOverview {
                    name: name.to_string(),
                    total: self.ledger.total(name),
                    standings,
                }
            })
            .collect();

        LedgerOverview {
            employees,
            maxima: targets.maxima().clone(),
            next_assignments: self.peek_assignments(),
            known_types: self.known_types.as_slice().to_vec(),
        }
    }

    /// Replaces the state with imported parts, registering every type the
    /// imported ledger uses.
    pub(crate) fn restore(
        &mut self,
        ledger: Ledger,
        mut known_types: KnownTypes,
        rotation: RotationState,
        history: Vec<LedgerEntry>,
    ) {
        for label in ledger.observed_types() {
            known_types.register(label);
        }
        self.ledger = ledger;
        self.known_types = known_types;
        self.rotation = rotation;
        self.history = history;
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new(KnownTypes::new(DEFAULT_DAMAGE_TYPES), TargetPolicy::default())
    }
}
