//! HTTP request handlers for the damage ledger API.
//!
//! This module contains the handler functions for all API endpoints. Every
//! handler locks the store once, performs one ledger operation and releases
//! the lock before the response is serialized.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::Local;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::LedgerResult;
use crate::ledger::{by_type_csv, export_file_name, import_value, snapshot, totals_csv};
use crate::models::BookingOutcome;

use super::request::{AddEmployeeRequest, AddTypeRequest, AdjustRequest, BookRequest, SetRequest};
use super::response::{
    ApiError, ApiErrorResponse, AssignmentResponse, DecrementResponse, EmployeeResponse,
    TypesResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/book", post(book_handler))
        .route("/overview", get(overview_handler))
        .route("/employees", post(add_employee_handler))
        .route(
            "/employees/:name",
            put(set_employee_handler).delete(remove_employee_handler),
        )
        .route("/employees/:name/increment", post(increment_handler))
        .route("/employees/:name/decrement", post(decrement_handler))
        .route("/types", get(list_types_handler).post(add_type_handler))
        .route("/types/reset", post(reset_types_handler))
        .route("/rotation", get(rotation_handler))
        .route("/rotation/advance", post(advance_all_handler))
        .route("/rotation/:damage_type/next", post(next_assignment_handler))
        .route("/state", get(export_state_handler).put(import_state_handler))
        .route("/export/totals.csv", get(totals_csv_handler))
        .route("/export/by_type.csv", get(by_type_csv_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, Json(body)).into_response()
}

fn error_response(correlation_id: Uuid, error: impl Into<ApiErrorResponse>) -> Response {
    let error = error.into();
    warn!(
        correlation_id = %correlation_id,
        code = %error.error.code,
        error = %error.error.message,
        "Request failed"
    );
    error.into_response()
}

/// Maps a body extraction failure to a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };

    json_response(StatusCode::BAD_REQUEST, error)
}

/// Handler for `POST /book`.
///
/// Parses every text with the grammar chain and books the records of the
/// whole batch at once.
async fn book_handler(
    State(state): State<AppState>,
    payload: Result<Json<BookRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    info!(
        correlation_id = %correlation_id,
        images = request.texts.len(),
        "Processing booking request"
    );

    let start_time = Instant::now();
    let report = state.store().await.book_texts(&request.texts, state.chain());

    let records = match &report.outcome {
        BookingOutcome::Booked(summary) => summary.records,
        BookingOutcome::EmptyInput | BookingOutcome::NoRecords => 0,
    };
    info!(
        correlation_id = %correlation_id,
        skipped = report.skipped,
        records,
        duration_us = start_time.elapsed().as_micros(),
        "Booking completed"
    );

    json_response(StatusCode::OK, report)
}

/// Handler for `GET /overview`.
async fn overview_handler(State(state): State<AppState>) -> Response {
    let overview = state.store().await.overview();
    json_response(StatusCode::OK, overview)
}

/// Handler for `POST /employees`.
async fn add_employee_handler(
    State(state): State<AppState>,
    payload: Result<Json<AddEmployeeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let mut store = state.store().await;
    match store.add_employee(&request.name) {
        Ok(name) => {
            info!(correlation_id = %correlation_id, employee = %name, "Employee added");
            let body = EmployeeResponse::from_ledger(store.ledger(), &name);
            json_response(StatusCode::CREATED, body)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `PUT /employees/:name`: overwrites total and breakdown.
async fn set_employee_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<SetRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let mut store = state.store().await;
    match store.set_absolute(&name, request.total, request.by_type) {
        Ok(()) => {
            let body = EmployeeResponse::from_ledger(store.ledger(), name.trim());
            json_response(StatusCode::OK, body)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `DELETE /employees/:name`.
async fn remove_employee_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.store().await.remove_employee(&name) {
        Ok(()) => {
            info!(correlation_id = %correlation_id, employee = %name, "Employee removed");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /employees/:name/increment`.
async fn increment_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<AdjustRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let mut store = state.store().await;
    match store.increment(&name, request.count, request.damage_type.as_deref()) {
        Ok(()) => {
            let body = EmployeeResponse::from_ledger(store.ledger(), name.trim());
            json_response(StatusCode::OK, body)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /employees/:name/decrement`.
async fn decrement_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<AdjustRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let mut store = state.store().await;
    match store.decrement(&name, request.count, request.damage_type.as_deref()) {
        Ok(removed) => {
            let body = DecrementResponse {
                removed,
                employee: EmployeeResponse::from_ledger(store.ledger(), name.trim()),
            };
            json_response(StatusCode::OK, body)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `GET /types`.
async fn list_types_handler(State(state): State<AppState>) -> Response {
    let known_types = state.store().await.known_types().as_slice().to_vec();
    json_response(StatusCode::OK, known_types)
}

/// Handler for `POST /types`.
///
/// Responds with 201 when the label was new and 200 when it was already
/// registered.
async fn add_type_handler(
    State(state): State<AppState>,
    payload: Result<Json<AddTypeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let mut store = state.store().await;
    match store.add_known_type(&request.label) {
        Ok(added) => {
            let status = if added {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            let body = TypesResponse {
                added,
                known_types: store.known_types().as_slice().to_vec(),
            };
            json_response(status, body)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /types/reset`.
async fn reset_types_handler(State(state): State<AppState>) -> Response {
    let mut store = state.store().await;
    store.reset_known_types();
    let body = TypesResponse {
        added: false,
        known_types: store.known_types().as_slice().to_vec(),
    };
    json_response(StatusCode::OK, body)
}

/// Handler for `GET /rotation`: the next assignee per known type, without
/// advancing anything.
async fn rotation_handler(State(state): State<AppState>) -> Response {
    let assignments = state.store().await.peek_assignments();
    json_response(StatusCode::OK, assignments)
}

/// Handler for `POST /rotation/advance`: one step of every known type.
async fn advance_all_handler(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();
    let assignments = state.store().await.advance_all();
    info!(
        correlation_id = %correlation_id,
        types = assignments.len(),
        "Advanced all rotations"
    );
    json_response(StatusCode::OK, assignments)
}

/// Handler for `POST /rotation/:damage_type/next`.
async fn next_assignment_handler(
    State(state): State<AppState>,
    Path(damage_type): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let employee = state.store().await.next_assignment(&damage_type);
    info!(
        correlation_id = %correlation_id,
        damage_type = %damage_type,
        employee = ?employee,
        "Assigned next unit"
    );
    json_response(StatusCode::OK, AssignmentResponse {
        damage_type,
        employee,
    })
}

/// Handler for `GET /state`.
async fn export_state_handler(State(state): State<AppState>) -> Response {
    let persisted = snapshot(&*state.store().await);
    json_response(StatusCode::OK, persisted)
}

/// Handler for `PUT /state`: replaces the store with an imported document.
async fn import_state_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let document = match payload {
        Ok(Json(document)) => document,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let result = import_value(&mut *state.store().await, document);
    match result {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                employees = report.employees,
                defaulted = ?report.defaulted,
                "State imported"
            );
            json_response(StatusCode::OK, report)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `GET /export/totals.csv`.
async fn totals_csv_handler(State(state): State<AppState>) -> Response {
    let csv = totals_csv(state.store().await.ledger());
    csv_response("totals", csv)
}

/// Handler for `GET /export/by_type.csv`.
async fn by_type_csv_handler(State(state): State<AppState>) -> Response {
    let csv = by_type_csv(state.store().await.ledger());
    csv_response("by_type", csv)
}

fn csv_response(prefix: &str, csv: LedgerResult<String>) -> Response {
    match csv {
        Ok(body) => {
            let disposition = format!(
                "attachment; filename=\"{}\"",
                export_file_name(prefix, &Local::now())
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response()
        }
        Err(err) => error_response(Uuid::new_v4(), err),
    }
}
