//! Book catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{Book, CreateBook, UpdateBook},
};

use super::borrows::MessageResponse;

/// Create a new book
#[utoipa::path(
    post,
    path = "/books/add",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Book already exists")
    )
)]
pub async fn create_book(
    State(state): State<crate::BookState>,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.books.create(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List all books
#[utoipa::path(
    get,
    path = "/books/all",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<Book>)
    )
)]
pub async fn list_books(State(state): State<crate::BookState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.books.list().await?;
    Ok(Json(books))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::BookState>,
    Path(book_id): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state.books.get(&book_id).await?;
    Ok(Json(book))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::BookState>,
    Path(book_id): Path<String>,
    Json(update): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    let book = state.books.update(&book_id, update).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::BookState>,
    Path(book_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.books.delete(&book_id).await?;
    Ok(Json(MessageResponse {
        message: "Book deleted successfully".to_string(),
    }))
}
