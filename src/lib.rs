//! Library services
//!
//! Two small HTTP services over PostgreSQL: a book catalog, and a borrow
//! ledger fed by borrow requests consumed from a RabbitMQ queue.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod telemetry;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Borrow service state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}

/// Book service state shared across all handlers
#[derive(Clone)]
pub struct BookState {
    pub books: services::books::BooksService,
}
