//! HTTP API module for the damage ledger.
//!
//! This module exposes the ledger to a display client: booking OCR texts,
//! manual edits, damage-type management, rotation, state import/export and
//! CSV downloads.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{AddEmployeeRequest, AddTypeRequest, AdjustRequest, BookRequest, SetRequest};
pub use response::{
    ApiError, ApiErrorResponse, AssignmentResponse, DecrementResponse, EmployeeResponse,
    TypesResponse,
};
pub use state::AppState;
