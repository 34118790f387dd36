//! Repository layer for database operations

pub mod books;
pub mod borrows;
pub mod migrations;

use sqlx::{Pool, Postgres};

pub use books::{BookStore, BooksRepository, MemoryBookStore};
pub use borrows::{BorrowLedgerStore, MemoryBorrowLedger, PgBorrowLedger};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub borrows: borrows::PgBorrowLedger,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            borrows: borrows::PgBorrowLedger::new(pool.clone()),
            pool,
        }
    }
}
