//! Health check endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, services::consumer::ConsumerState};

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Current status of the service
    pub status: String,
    /// Version of the service
    pub version: String,
    /// State of the borrow-request consumer, borrow service only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer: Option<ConsumerState>,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        consumer: None,
    })
}

/// Readiness of the borrow service (checks the ledger, reports the consumer state)
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 500, description = "Database unreachable")
    )
)]
pub async fn borrow_readiness(
    State(state): State<crate::AppState>,
) -> AppResult<Json<HealthResponse>> {
    state.services.borrows.ping().await?;
    let consumer = *state.services.consumer_state.borrow();
    Ok(Json(HealthResponse {
        status: "ready".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        consumer: Some(consumer),
    }))
}

/// Readiness of the book service (checks database connectivity)
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 500, description = "Database unreachable")
    )
)]
pub async fn book_readiness(State(state): State<crate::BookState>) -> AppResult<Json<HealthResponse>> {
    state.books.ping().await?;
    Ok(Json(HealthResponse {
        status: "ready".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        consumer: None,
    }))
}
