//! Response types for the damage ledger API.
//!
//! This module defines the error response structures and the small JSON
//! bodies returned by mutating endpoints.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::models::Ledger;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<LedgerError> for ApiErrorResponse {
    fn from(error: LedgerError) -> Self {
        let message = error.to_string();
        let (status, code, details) = match &error {
            LedgerError::InvalidEmployee { name, .. } => {
                (StatusCode::BAD_REQUEST, "INVALID_EMPLOYEE", Some(name))
            }
            LedgerError::InvalidDamageType { label, .. } => {
                (StatusCode::BAD_REQUEST, "INVALID_DAMAGE_TYPE", Some(label))
            }
            LedgerError::InvalidPattern { pattern, .. } => {
                (StatusCode::BAD_REQUEST, "INVALID_PATTERN", Some(pattern))
            }
            LedgerError::StateImport { .. } => {
                (StatusCode::BAD_REQUEST, "STATE_IMPORT_FAILED", None)
            }
            LedgerError::DuplicateEmployee { name } => {
                (StatusCode::CONFLICT, "DUPLICATE_EMPLOYEE", Some(name))
            }
            LedgerError::EmployeeNotFound { name } => {
                (StatusCode::NOT_FOUND, "EMPLOYEE_NOT_FOUND", Some(name))
            }
            LedgerError::ConfigNotFound { path } | LedgerError::ConfigParseError { path, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", Some(path))
            }
            LedgerError::Export { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_FAILED", None),
        };

        let error = match details {
            Some(details) => ApiError::with_details(code, message, details.clone()),
            None => ApiError::new(code, message),
        };

        ApiErrorResponse { status, error }
    }
}

/// One employee's current ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeResponse {
    /// The employee.
    pub name: String,
    /// Current total.
    pub total: u64,
    /// Current subtotals.
    pub by_type: BTreeMap<String, u64>,
}

impl EmployeeResponse {
    /// Reads the employee's entry from the ledger.
    pub fn from_ledger(ledger: &Ledger, name: &str) -> Self {
        Self {
            name: name.to_string(),
            total: ledger.total(name),
            by_type: ledger.by_type().get(name).cloned().unwrap_or_default(),
        }
    }
}

/// Result of a decrement, including how much was actually removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecrementResponse {
    /// The amount removed from the total after clamping.
    pub removed: u64,
    /// The employee after the decrement.
    pub employee: EmployeeResponse,
}

/// Result of advancing one rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentResponse {
    /// The damage type.
    pub damage_type: String,
    /// The assigned employee; `None` when the ledger has no employees.
    pub employee: Option<String>,
}

/// Registered damage types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypesResponse {
    /// Whether the request registered a new type.
    pub added: bool,
    /// All registered types in order.
    pub known_types: Vec<String>,
}
