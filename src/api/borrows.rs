//! Borrow ledger endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::borrow::{BorrowCount, BorrowRecord},
};

/// Message response
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// List every borrow record
#[utoipa::path(
    get,
    path = "/borrowed_books",
    tag = "borrows",
    responses(
        (status = 200, description = "All borrow records", body = Vec<BorrowRecord>),
        (status = 500, description = "Failed to fetch borrowed books")
    )
)]
pub async fn list_borrowed_books(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BorrowRecord>>> {
    let records = state.services.borrows.list_all().await?;
    Ok(Json(records))
}

/// Delete every borrow record
#[utoipa::path(
    delete,
    path = "/borrowed_books/clear",
    tag = "borrows",
    responses(
        (status = 200, description = "Ledger cleared", body = MessageResponse),
        (status = 500, description = "Failed to delete borrowed book records")
    )
)]
pub async fn clear_borrowed_books(
    State(state): State<crate::AppState>,
) -> AppResult<Json<MessageResponse>> {
    state.services.borrows.clear_all().await?;
    Ok(Json(MessageResponse {
        message: "All borrowed book records deleted successfully".to_string(),
    }))
}

/// Number of borrow records held by a student
#[utoipa::path(
    get,
    path = "/test_borrow_count/{student_id}",
    tag = "borrows",
    params(
        ("student_id" = String, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Current borrow count", body = BorrowCount)
    )
)]
pub async fn borrow_count(
    State(state): State<crate::AppState>,
    Path(student_id): Path<String>,
) -> AppResult<Json<BorrowCount>> {
    let count = state.services.borrows.count_for_student(&student_id).await?;
    Ok(Json(count))
}
