//! Borrow service HTTP surface against the in-memory ledger

use std::sync::Arc;

use axum::http::StatusCode;
use library_services::repository::{BorrowLedgerStore, MemoryBorrowLedger};

use crate::common::{
    body_json, borrow_message, borrows_service, build_test_app, send, UnreachableLedger,
};

#[tokio::test]
async fn list_returns_every_record() {
    let ledger = Arc::new(MemoryBorrowLedger::new());
    let service = borrows_service(ledger.clone());
    service.process_message(&borrow_message("S1", "B1")).await;
    service.process_message(&borrow_message("S2", "B2")).await;

    let response = send(build_test_app(ledger), "GET", "/borrowed_books").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["student_id"], "S1");
    assert_eq!(records[0]["date_borrowed"], "2024-10-01");
    assert_eq!(records[1]["book_id"], "B2");
}

#[tokio::test]
async fn clear_removes_every_record() {
    let ledger = Arc::new(MemoryBorrowLedger::new());
    let service = borrows_service(ledger.clone());
    for book in ["B1", "B2", "B3"] {
        service.process_message(&borrow_message("S1", book)).await;
    }
    assert_eq!(ledger.list_all().await.unwrap().len(), 3);

    let response = send(build_test_app(ledger.clone()), "DELETE", "/borrowed_books/clear").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "All borrowed book records deleted successfully");
    assert!(ledger.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn borrow_count_reports_current_count() {
    let ledger = Arc::new(MemoryBorrowLedger::new());
    let service = borrows_service(ledger.clone());
    service.process_message(&borrow_message("S1", "B1")).await;
    service.process_message(&borrow_message("S1", "B2")).await;

    let response = send(build_test_app(ledger.clone()), "GET", "/test_borrow_count/S1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["student_id"], "S1");
    assert_eq!(json["borrowed_count"], 2);

    let response = send(build_test_app(ledger), "GET", "/test_borrow_count/S9").await;
    let json = body_json(response).await;
    assert_eq!(json["borrowed_count"], 0);
}

#[tokio::test]
async fn ready_reports_consumer_state() {
    let ledger = Arc::new(MemoryBorrowLedger::new());
    let response = send(build_test_app(ledger), "GET", "/ready").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ready");
    assert_eq!(json["consumer"], "consuming");
}

#[tokio::test]
async fn ready_fails_when_database_is_unreachable() {
    let response = send(build_test_app(Arc::new(UnreachableLedger)), "GET", "/ready").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["error"], "DbFailure");

    // Liveness does not depend on the database
    let response = send(build_test_app(Arc::new(UnreachableLedger)), "GET", "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let ledger = Arc::new(MemoryBorrowLedger::new());
    let response = send(build_test_app(ledger), "GET", "/borrowed_books/S1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
