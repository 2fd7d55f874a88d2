//! Integration tests for the damage ledger HTTP API.
//!
//! This test suite drives the router end to end:
//! - Booking row-style and block-style OCR texts
//! - Empty and unrecognized input
//! - Manual edits of employees
//! - Damage-type registration
//! - Targets and rotation in the overview
//! - State export/import
//! - CSV downloads
//! - Error cases

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use damage_ledger::api::{AppState, create_router};
use damage_ledger::config::ConfigLoader;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config/ledger.yaml").expect("Failed to load config");
    AppState::from_config(&config).expect("Failed to build state")
}

fn router(state: &AppState) -> Router {
    create_router(state.clone())
}

async fn send_raw(
    state: &AppState,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Bytes) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, headers, bytes)
}

async fn send(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, _, bytes) = send_raw(state, method, uri, body).await;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn book(state: &AppState, texts: &[&str]) -> (StatusCode, Value) {
    send(state, "POST", "/book", Some(json!({ "texts": texts }))).await
}

fn standing<'a>(overview: &'a Value, employee: &str, damage_type: &str) -> &'a Value {
    let row = overview["employees"]
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["name"] == employee)
        .unwrap_or_else(|| panic!("no overview row for {}", employee));
    row["standings"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["damage_type"] == damage_type)
        .unwrap_or_else(|| panic!("no standing for {} / {}", employee, damage_type))
}

const BLOCK_REPORT: &str =
    "AnzahlvonSCHADEN ZUSTAENDIG 316 JHackenbroich 169 MMueller RD ID Regulierer Sachverständiger";

// =============================================================================
// Booking
// =============================================================================

#[tokio::test]
async fn test_book_row_report() {
    let state = create_test_state();

    let (status, report) = book(&state, &["12 MMueller Regulierer\n3 JHackenbroich Gutachter"]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["images"], 1);
    assert_eq!(report["grammars"], json!(["row"]));
    assert_eq!(report["outcome"]["status"], "booked");
    assert_eq!(report["outcome"]["records"], 2);
    assert_eq!(report["outcome"]["new_types"], json!(["Gutachter"]));
    assert_eq!(report["outcome"]["employees"]["MMueller"]["total"], 12);
}

#[tokio::test]
async fn test_book_block_report() {
    let state = create_test_state();

    let (status, report) = book(&state, &[BLOCK_REPORT]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["grammars"], json!(["block"]));
    assert_eq!(
        report["outcome"]["employees"]["JHackenbroich"]["types"]["Regulierer"],
        316
    );
    assert_eq!(
        report["outcome"]["employees"]["MMueller"]["types"]["Sachverständiger"],
        169
    );
}

#[tokio::test]
async fn test_book_batch_sums_across_images() {
    let state = create_test_state();

    let (status, report) = book(
        &state,
        &["5 MMueller Regulierer", "", "7 MMueller Regulierer"],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["images"], 3);
    assert_eq!(report["skipped"], 1);
    assert_eq!(report["outcome"]["employees"]["MMueller"]["total"], 12);
}

#[tokio::test]
async fn test_book_only_empty_texts() {
    let state = create_test_state();

    let (status, report) = book(&state, &["", "   "]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["outcome"]["status"], "empty_input");
    assert_eq!(report["skipped"], 2);
}

#[tokio::test]
async fn test_book_unrecognized_text() {
    let state = create_test_state();

    let (status, report) = book(&state, &["Sehr geehrte Damen und Herren"]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["outcome"]["status"], "no_records");

    let (_, overview) = send(&state, "GET", "/overview", None).await;
    assert_eq!(overview["employees"], json!([]));
}

#[tokio::test]
async fn test_book_same_text_twice_counts_twice() {
    let state = create_test_state();

    book(&state, &["4 MMueller Regulierer"]).await;
    book(&state, &["4 MMueller Regulierer"]).await;

    let (_, overview) = send(&state, "GET", "/overview", None).await;
    assert_eq!(overview["employees"][0]["total"], 8);
}

#[tokio::test]
async fn test_book_malformed_json() {
    let state = create_test_state();

    let response = router(&state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/book")
                .header("Content-Type", "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_book_missing_texts_field() {
    let state = create_test_state();

    let (status, error) = send(&state, "POST", "/book", Some(json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_ERROR");
}

// =============================================================================
// Overview, targets and rotation
// =============================================================================

#[tokio::test]
async fn test_overview_orders_names_case_insensitively() {
    let state = create_test_state();
    book(&state, &["1 bob Regulierer\n1 Alice Regulierer\n1 carl Regulierer"]).await;

    let (_, overview) = send(&state, "GET", "/overview", None).await;

    let names: Vec<&str> = overview["employees"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice", "bob", "carl"]);
}

#[tokio::test]
async fn test_overview_targets_and_deltas() {
    let state = create_test_state();
    book(&state, &["10 A Regulierer\n4 B Regulierer"]).await;

    let (status, overview) = send(&state, "GET", "/overview", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["maxima"]["Regulierer"], 10);
    let b = standing(&overview, "B", "Regulierer");
    assert_eq!(b["count"], 4);
    assert_eq!(b["target"], 10);
    assert_eq!(b["delta"], -6);
    assert_eq!(overview["next_assignments"]["Regulierer"], "B");
}

#[tokio::test]
async fn test_overview_applies_configured_reduction() {
    let state = create_test_state();
    book(&state, &["100 A Regulierer\n50 cgrothe Regulierer"]).await;

    let (_, overview) = send(&state, "GET", "/overview", None).await;

    let reduced = standing(&overview, "cgrothe", "Regulierer");
    assert_eq!(reduced["target"], 75);
    assert_eq!(reduced["delta"], -25);
}

#[tokio::test]
async fn test_rotation_next_assigns_below_target() {
    let state = create_test_state();
    book(&state, &["10 A Regulierer\n4 B Regulierer\n2 C Regulierer"]).await;

    let (status, first) = send(&state, "POST", "/rotation/Regulierer/next", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, json!({ "damage_type": "Regulierer", "employee": "B" }));

    let (_, second) = send(&state, "POST", "/rotation/Regulierer/next", None).await;
    assert_eq!(second["employee"], "C");

    let (_, third) = send(&state, "POST", "/rotation/Regulierer/next", None).await;
    assert_eq!(third["employee"], "B");
}

#[tokio::test]
async fn test_rotation_peek_does_not_advance() {
    let state = create_test_state();
    book(&state, &["10 A Regulierer\n4 B Regulierer\n2 C Regulierer"]).await;

    let (_, peek) = send(&state, "GET", "/rotation", None).await;
    assert_eq!(peek["Regulierer"], "B");
    let (_, peek_again) = send(&state, "GET", "/rotation", None).await;
    assert_eq!(peek_again["Regulierer"], "B");

    let (_, next) = send(&state, "POST", "/rotation/Regulierer/next", None).await;
    assert_eq!(next["employee"], "B");
}

#[tokio::test]
async fn test_rotation_on_empty_ledger() {
    let state = create_test_state();

    let (status, next) = send(&state, "POST", "/rotation/Regulierer/next", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(next["employee"], Value::Null);
}

#[tokio::test]
async fn test_rotation_advance_all_covers_known_types() {
    let state = create_test_state();
    book(&state, &["3 A Regulierer\n1 B Sachverständiger"]).await;

    let (status, assignments) = send(&state, "POST", "/rotation/advance", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(assignments["Regulierer"], "B");
    assert_eq!(assignments["Sachverständiger"], "A");
}

// =============================================================================
// Manual edits
// =============================================================================

#[tokio::test]
async fn test_add_employee() {
    let state = create_test_state();

    let (status, body) = send(&state, "POST", "/employees", Some(json!({ "name": " Neu " }))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Neu");
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_add_duplicate_employee_conflicts() {
    let state = create_test_state();
    send(&state, "POST", "/employees", Some(json!({ "name": "Neu" }))).await;

    let (status, error) = send(&state, "POST", "/employees", Some(json!({ "name": "Neu" }))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "DUPLICATE_EMPLOYEE");
}

#[tokio::test]
async fn test_add_blank_employee_rejected() {
    let state = create_test_state();

    let (status, error) = send(&state, "POST", "/employees", Some(json!({ "name": "  " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_EMPLOYEE");
}

#[tokio::test]
async fn test_increment_and_decrement() {
    let state = create_test_state();

    let (status, body) = send(
        &state,
        "POST",
        "/employees/MMueller/increment",
        Some(json!({ "count": 5, "damage_type": "Regulierer" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    assert_eq!(body["by_type"]["Regulierer"], 5);

    let (status, body) = send(
        &state,
        "POST",
        "/employees/MMueller/decrement",
        Some(json!({ "count": 8, "damage_type": "Regulierer" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 5);
    assert_eq!(body["employee"]["total"], 0);
    assert_eq!(body["employee"]["by_type"]["Regulierer"], 0);
}

#[tokio::test]
async fn test_increment_defaults_to_one() {
    let state = create_test_state();

    let (_, body) = send(&state, "POST", "/employees/A/increment", Some(json!({}))).await;

    assert_eq!(body["total"], 1);
    assert_eq!(body["by_type"], json!({}));
}

#[tokio::test]
async fn test_decrement_unknown_employee() {
    let state = create_test_state();

    let (status, error) =
        send(&state, "POST", "/employees/ghost/decrement", Some(json!({ "count": 1 }))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "EMPLOYEE_NOT_FOUND");
    assert_eq!(error["details"], "ghost");
}

#[tokio::test]
async fn test_book_huge_counts_do_not_fail() {
    let state = create_test_state();

    let (status, report) = book(
        &state,
        &["10000000000000000000 A Regulierer\n10000000000000000000 A Regulierer"],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["outcome"]["employees"]["A"]["total"], u64::MAX);
}

#[tokio::test]
async fn test_set_absolute_overwrites() {
    let state = create_test_state();
    book(&state, &["9 A Regulierer\n2 A Gutachter"]).await;

    let (status, body) = send(
        &state,
        "PUT",
        "/employees/A",
        Some(json!({ "total": 4, "by_type": { "Regulierer": 4 } })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    assert_eq!(body["by_type"], json!({ "Regulierer": 4 }));

    let (_, persisted) = send(&state, "GET", "/state", None).await;
    let last = persisted["history"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["op"], "set");
}

#[tokio::test]
async fn test_remove_employee() {
    let state = create_test_state();
    book(&state, &["3 A Regulierer"]).await;

    let (status, _) = send(&state, "DELETE", "/employees/A", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, error) = send(&state, "DELETE", "/employees/A", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "EMPLOYEE_NOT_FOUND");
}

// =============================================================================
// Damage types
// =============================================================================

#[tokio::test]
async fn test_default_types() {
    let state = create_test_state();

    let (status, types) = send(&state, "GET", "/types", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(types, json!(["Regulierer", "Sachverständiger"]));
}

#[tokio::test]
async fn test_add_type_reports_novelty() {
    let state = create_test_state();

    let (status, body) = send(&state, "POST", "/types", Some(json!({ "label": "Gutachter" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["added"], true);

    let (status, body) = send(&state, "POST", "/types", Some(json!({ "label": "Gutachter" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], false);
    assert_eq!(body["known_types"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_add_blank_type_rejected() {
    let state = create_test_state();

    let (status, error) = send(&state, "POST", "/types", Some(json!({ "label": " " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_DAMAGE_TYPE");
}

#[tokio::test]
async fn test_reset_types_keeps_types_in_use() {
    let state = create_test_state();
    book(&state, &["2 A Gutachter"]).await;
    send(&state, "POST", "/types", Some(json!({ "label": "Unbenutzt" }))).await;

    let (status, body) = send(&state, "POST", "/types/reset", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["known_types"],
        json!(["Regulierer", "Sachverständiger", "Gutachter"])
    );
}

// =============================================================================
// State export/import
// =============================================================================

#[tokio::test]
async fn test_state_round_trip_between_instances() {
    let source = create_test_state();
    book(&source, &[BLOCK_REPORT]).await;
    send(&source, "POST", "/rotation/Regulierer/next", None).await;

    let (status, persisted) = send(&source, "GET", "/state", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(persisted["counts_total"]["JHackenbroich"], 316);

    let target = create_test_state();
    let (status, report) = send(&target, "PUT", "/state", Some(persisted.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["employees"], 2);
    assert_eq!(report["defaulted"], json!([]));

    let (_, restored) = send(&target, "GET", "/state", None).await;
    assert_eq!(restored, persisted);
}

#[tokio::test]
async fn test_state_import_fills_missing_keys() {
    let state = create_test_state();

    let (status, report) = send(
        &state,
        "PUT",
        "/state",
        Some(json!({ "counts_total": { "A": 3 }, "counts_by_type": "garbage" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["employees"], 1);
    let defaulted = report["defaulted"].as_array().unwrap();
    assert!(defaulted.contains(&json!("counts_by_type")));
    assert!(defaulted.contains(&json!("known_types")));
    assert_eq!(report["known_types"], 2);
}

#[tokio::test]
async fn test_state_import_rejects_non_object() {
    let state = create_test_state();
    book(&state, &["3 A Regulierer"]).await;

    let (status, error) = send(&state, "PUT", "/state", Some(json!([1, 2, 3]))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "STATE_IMPORT_FAILED");

    let (_, overview) = send(&state, "GET", "/overview", None).await;
    assert_eq!(overview["employees"][0]["total"], 3);
}

// =============================================================================
// CSV export
// =============================================================================

#[tokio::test]
async fn test_export_totals_csv() {
    let state = create_test_state();
    book(&state, &["3 b Regulierer\n5 A Regulierer"]).await;

    let (status, headers, body) = send_raw(&state, "GET", "/export/totals.csv", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.contains("filename=\"totals_"));
    assert!(disposition.ends_with(".csv\""));
    assert_eq!(body, "name,total\nA,5\nb,3\n");
}

#[tokio::test]
async fn test_export_by_type_csv() {
    let state = create_test_state();
    book(&state, &["3 A Regulierer\n2 A Gutachter"]).await;

    let (status, _, body) = send_raw(&state, "GET", "/export/by_type.csv", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "name,rd_id,count\nA,Gutachter,2\nA,Regulierer,3\n");
}
