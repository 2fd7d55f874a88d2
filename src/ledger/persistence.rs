//! JSON snapshot and lenient import of the ledger state.
//!
//! The snapshot layout matches the state files written by earlier versions
//! of the tool (`counts_total`, `counts_by_type`, `history`, `known_types`)
//! plus the rotation indices. Import favours availability: a missing or
//! mis-shaped key falls back to its default instead of failing the import.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{KnownTypes, Ledger, LedgerEntry};

use super::rotation::RotationState;
use super::store::LedgerStore;

/// Serializable form of a [`LedgerStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Total per employee.
    #[serde(default)]
    pub counts_total: BTreeMap<String, u64>,
    /// Subtotal per employee and damage type.
    #[serde(default)]
    pub counts_by_type: BTreeMap<String, BTreeMap<String, u64>>,
    /// Audit trail.
    #[serde(default)]
    pub history: Vec<LedgerEntry>,
    /// Registered damage types.
    #[serde(default)]
    pub known_types: KnownTypes,
    /// Rotation index per damage type.
    #[serde(default)]
    pub rotation: BTreeMap<String, usize>,
}

/// What an import did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Top-level keys that were missing or unreadable and got defaults.
    pub defaulted: Vec<String>,
    /// Number of employees after the import.
    pub employees: usize,
    /// Number of registered damage types after the import.
    pub known_types: usize,
}

/// Captures the store as a serializable snapshot.
pub fn snapshot(store: &LedgerStore) -> PersistedState {
    PersistedState {
        counts_total: store.ledger().totals().clone(),
        counts_by_type: store.ledger().by_type().clone(),
        history: store.history().to_vec(),
        known_types: store.known_types().clone(),
        rotation: store.rotation().as_map().clone(),
    }
}

/// Serializes the store as pretty-printed JSON.
pub fn export_json(store: &LedgerStore) -> LedgerResult<String> {
    serde_json::to_string_pretty(&snapshot(store)).map_err(|e| LedgerError::Export {
        message: e.to_string(),
    })
}

/// Reads one top-level key, falling back to the default when it is absent
/// or has the wrong shape.
fn take_key<T: DeserializeOwned + Default>(
    object: &mut Map<String, Value>,
    key: &str,
    defaulted: &mut Vec<String>,
) -> T {
    match object.remove(key) {
        Some(Value::Null) | None => {
            defaulted.push(key.to_string());
            T::default()
        }
        Some(value) => match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(key, error = %e, "Unreadable state key, using default");
                defaulted.push(key.to_string());
                T::default()
            }
        },
    }
}

/// Replaces the store's state with a parsed JSON payload.
///
/// Anything that is not a JSON object is rejected and the store is left
/// untouched. Within an object every key is read independently.
pub fn import_value(store: &mut LedgerStore, payload: Value) -> LedgerResult<ImportReport> {
    let Value::Object(mut object) = payload else {
        return Err(LedgerError::StateImport {
            message: "payload is not a JSON object".to_string(),
        });
    };

    let mut defaulted = Vec::new();
    let counts_total: BTreeMap<String, u64> = take_key(&mut object, "counts_total", &mut defaulted);
    let counts_by_type: BTreeMap<String, BTreeMap<String, u64>> =
        take_key(&mut object, "counts_by_type", &mut defaulted);
    let history: Vec<LedgerEntry> = take_key(&mut object, "history", &mut defaulted);
    let rotation: BTreeMap<String, usize> = take_key(&mut object, "rotation", &mut defaulted);

    let mut known_types: KnownTypes = take_key(&mut object, "known_types", &mut defaulted);
    if known_types.is_empty() {
        known_types = store.default_types().clone();
    }

    store.restore(
        Ledger::from_parts(counts_total, counts_by_type),
        known_types,
        RotationState::from_map(rotation),
        history,
    );

    let report = ImportReport {
        defaulted,
        employees: store.ledger().totals().len(),
        known_types: store.known_types().len(),
    };

    if report.defaulted.is_empty() {
        info!(employees = report.employees, "Imported state");
    } else {
        warn!(
            employees = report.employees,
            defaulted = ?report.defaulted,
            "Imported state with defaults"
        );
    }

    Ok(report)
}

/// Parses a JSON document and imports it, see [`import_value`].
///
/// # Example
///
/// ```
/// use damage_ledger::ledger::{LedgerStore, import_json};
///
/// let mut store = LedgerStore::default();
/// let report = import_json(&mut store, r#"{"counts_total": {"MMueller": 4}}"#).unwrap();
///
/// assert_eq!(store.ledger().total("MMueller"), 4);
/// assert!(report.defaulted.contains(&"known_types".to_string()));
/// assert_eq!(store.known_types().len(), 2);
///
/// assert!(import_json(&mut store, "[1, 2, 3]").is_err());
/// assert_eq!(store.ledger().total("MMueller"), 4);
/// ```
pub fn import_json(store: &mut LedgerStore, json: &str) -> LedgerResult<ImportReport> {
    let payload: Value = serde_json::from_str(json).map_err(|e| LedgerError::StateImport {
        message: e.to_string(),
    })?;
    import_value(store, payload)
}
