//! HTTP handlers and routers for both services

pub mod books;
pub mod borrows;
pub mod health;
pub mod openapi;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{AppState, BookState};

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Router of the borrow service: ledger inspection and administration
pub fn borrow_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::borrow_readiness))
        .route("/borrowed_books", get(borrows::list_borrowed_books))
        .route("/borrowed_books/clear", delete(borrows::clear_borrowed_books))
        .route("/test_borrow_count/:student_id", get(borrows::borrow_count))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(openapi::borrow_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors())
}

/// Router of the book service: catalog CRUD
pub fn book_router(state: BookState) -> Router {
    let routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::book_readiness))
        .route("/books/add", post(books::create_book))
        .route("/books/all", get(books::list_books))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(openapi::book_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors())
}
