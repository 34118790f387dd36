//! Live API tests against a running stack
//!
//! Requires the book service on :5006, the borrow service on :5003 with its
//! consumer attached to RabbitMQ, and a user service that knows `S1`.
//! Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BOOK_URL: &str = "http://localhost:5006";
const BORROW_URL: &str = "http://localhost:5003";

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    for base in [BOOK_URL, BORROW_URL] {
        let response = client
            .get(format!("{}/health", base))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());

        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["status"], "healthy");
    }
}

#[tokio::test]
#[ignore]
async fn test_book_crud() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books/add", BOOK_URL))
        .json(&json!({
            "book_id": "LIVE-1",
            "title": "Test Book",
            "author": "Test Author",
            "publish_date": "2020-01-31"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .put(format!("{}/books/LIVE-1", BOOK_URL))
        .json(&json!({ "title": "Renamed" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["title"], "Renamed");
    assert_eq!(body["author"], "Test Author");
    assert_eq!(body["publish_date"], "2020-01-31");

    let response = client
        .delete(format!("{}/books/LIVE-1", BOOK_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/books/LIVE-1", BOOK_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Book not found");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_book_conflicts() {
    let client = Client::new();
    let book = json!({
        "book_id": "LIVE-2",
        "title": "Test Book",
        "author": "Test Author",
        "publish_date": "2020-01-31"
    });

    let first = client
        .post(format!("{}/books/add", BOOK_URL))
        .json(&book)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(first.status(), 201);

    let second = client
        .post(format!("{}/books/add", BOOK_URL))
        .json(&book)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(second.status(), 409);

    let _ = client
        .delete(format!("{}/books/LIVE-2", BOOK_URL))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_clear_borrowed_books() {
    let client = Client::new();

    let response = client
        .delete(format!("{}/borrowed_books/clear", BORROW_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "All borrowed book records deleted successfully");

    let response = client
        .get(format!("{}/borrowed_books", BORROW_URL))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body.as_array().map(Vec::len), Some(0));

    let response = client
        .get(format!("{}/test_borrow_count/S1", BORROW_URL))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["borrowed_count"], 0);
}
