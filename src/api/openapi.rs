//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrows, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Borrow Service API",
        version = "0.1.0",
        description = "Borrow ledger inspection and administration"
    ),
    paths(
        health::health_check,
        health::borrow_readiness,
        borrows::list_borrowed_books,
        borrows::clear_borrowed_books,
        borrows::borrow_count,
    ),
    components(
        schemas(
            crate::models::borrow::BorrowRecord,
            crate::models::borrow::BorrowCount,
            borrows::MessageResponse,
            health::HealthResponse,
            crate::services::consumer::ConsumerState,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "borrows", description = "Borrow ledger")
    )
)]
pub struct BorrowApiDoc;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Book Service API",
        version = "0.1.0",
        description = "Book catalog"
    ),
    paths(
        health::health_check,
        health::book_readiness,
        books::create_book,
        books::list_books,
        books::get_book,
        books::update_book,
        books::delete_book,
    ),
    components(
        schemas(
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            borrows::MessageResponse,
            health::HealthResponse,
            crate::services::consumer::ConsumerState,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog")
    )
)]
pub struct BookApiDoc;

pub fn borrow_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", BorrowApiDoc::openapi()))
}

pub fn book_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", BookApiDoc::openapi()))
}
