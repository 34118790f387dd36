//! Schema migrations of both services
//!
//! Both services may share one database, and therefore one
//! `_sqlx_migrations` table. Each migrator ignores the versions applied by
//! the other, and the two sets never reuse a version.

use sqlx::{migrate::Migrator, Pool, Postgres};

pub fn books_migrator() -> Migrator {
    let mut migrator = sqlx::migrate!("./migrations/books");
    migrator.set_ignore_missing(true);
    migrator
}

pub fn borrows_migrator() -> Migrator {
    let mut migrator = sqlx::migrate!("./migrations/borrows");
    migrator.set_ignore_missing(true);
    migrator
}

/// Create or upgrade the `books` table
pub async fn run_books(pool: &Pool<Postgres>) -> Result<(), sqlx::migrate::MigrateError> {
    books_migrator().run(pool).await
}

/// Create or upgrade the `borrowed_books` table
pub async fn run_borrows(pool: &Pool<Postgres>) -> Result<(), sqlx::migrate::MigrateError> {
    borrows_migrator().run(pool).await
}
