//! Request types for the damage ledger API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Request body for `POST /book`: one recognized text per image.
///
/// An empty string marks an image whose recognition failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRequest {
    /// OCR output, one entry per image.
    pub texts: Vec<String>,
}

/// Request body for `POST /employees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddEmployeeRequest {
    /// The employee's name.
    pub name: String,
}

/// Request body for the increment and decrement endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustRequest {
    /// Amount to add or remove.
    #[serde(default = "default_count")]
    pub count: u64,
    /// Damage type to adjust alongside the total.
    #[serde(default)]
    pub damage_type: Option<String>,
}

fn default_count() -> u64 {
    1
}

/// Request body for `PUT /employees/:name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRequest {
    /// The new total.
    pub total: u64,
    /// The new breakdown; replaces the existing one entirely.
    #[serde(default)]
    pub by_type: BTreeMap<String, u64>,
}

/// Request body for `POST /types`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTypeRequest {
    /// The damage-type label.
    pub label: String,
}
