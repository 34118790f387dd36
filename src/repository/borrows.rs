//! Borrow ledger: the persistent record of loans
//!
//! The limit check in the consumer is a plain count followed by an insert.
//! Neither implementation below locks across the two calls, so concurrent
//! writers for the same student can exceed the limit.

use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::borrow::{BorrowRecord, NewBorrowRecord},
};

/// Storage for borrow records, independent of the engine behind it
#[async_trait]
pub trait BorrowLedgerStore: Send + Sync {
    /// Number of records held by a student
    async fn count_by_student(&self, student_id: &str) -> AppResult<i64>;

    /// Append a record, duplicates are allowed
    async fn insert(&self, record: &NewBorrowRecord) -> AppResult<()>;

    /// Every record in insertion order
    async fn list_all(&self) -> AppResult<Vec<BorrowRecord>>;

    /// Remove every record, returning how many were removed
    async fn delete_all(&self) -> AppResult<u64>;

    /// Cheap round-trip used by the readiness check
    async fn ping(&self) -> AppResult<()> {
        self.count_by_student("").await.map(|_| ())
    }
}

#[derive(Clone)]
pub struct PgBorrowLedger {
    pool: Pool<Postgres>,
}

impl PgBorrowLedger {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowLedgerStore for PgBorrowLedger {
    async fn count_by_student(&self, student_id: &str) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrowed_books WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn insert(&self, record: &NewBorrowRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO borrowed_books (student_id, book_id, date_borrowed, date_returned)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&record.student_id)
        .bind(&record.book_id)
        .bind(record.date_borrowed)
        .bind(record.date_returned)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<BorrowRecord>> {
        let rows = sqlx::query_as::<_, BorrowRecord>(
            "SELECT student_id, book_id, date_borrowed, date_returned FROM borrowed_books ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM borrowed_books")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// In-process ledger without persistence
#[derive(Default)]
pub struct MemoryBorrowLedger {
    records: Mutex<Vec<BorrowRecord>>,
}

impl MemoryBorrowLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<BorrowRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Vec<BorrowRecord>>> {
        self.records
            .lock()
            .map_err(|_| AppError::Internal("Borrow ledger lock poisoned".to_string()))
    }
}

#[async_trait]
impl BorrowLedgerStore for MemoryBorrowLedger {
    async fn count_by_student(&self, student_id: &str) -> AppResult<i64> {
        let records = self.lock()?;
        Ok(records.iter().filter(|r| r.student_id == student_id).count() as i64)
    }

    async fn insert(&self, record: &NewBorrowRecord) -> AppResult<()> {
        self.lock()?.push(record.clone());
        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<BorrowRecord>> {
        Ok(self.lock()?.clone())
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let mut records = self.lock()?;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }
}
