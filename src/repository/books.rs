//! Books repository for database operations

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{conflict_on_duplicate, AppError, AppResult},
    models::book::Book,
};

/// Storage for the book catalog
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Get book by ID
    async fn get_by_id(&self, book_id: &str) -> AppResult<Book>;

    /// Every book ordered by ID
    async fn list(&self) -> AppResult<Vec<Book>>;

    /// Insert a new book; an existing ID is a conflict
    async fn create(&self, book: &Book) -> AppResult<Book>;

    /// Overwrite the mutable columns of an existing book
    async fn update(&self, book: &Book) -> AppResult<Book>;

    async fn delete(&self, book_id: &str) -> AppResult<()>;

    /// Cheap round-trip used by the readiness check
    async fn ping(&self) -> AppResult<()>;
}

fn already_exists(book_id: &str) -> String {
    format!("Book {} already exists", book_id)
}

fn not_found() -> AppError {
    AppError::NotFound("Book not found".to_string())
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn get_by_id(&self, book_id: &str) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT book_id, title, author, publish_date FROM books WHERE book_id = $1",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(not_found)
    }

    async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT book_id, title, author, publish_date FROM books ORDER BY book_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn create(&self, book: &Book) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (book_id, title, author, publish_date)
            VALUES ($1, $2, $3, $4)
            RETURNING book_id, title, author, publish_date
            "#,
        )
        .bind(&book.book_id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.publish_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_duplicate(e, already_exists(&book.book_id)))
    }

    async fn update(&self, book: &Book) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET title = $2, author = $3, publish_date = $4
            WHERE book_id = $1
            RETURNING book_id, title, author, publish_date
            "#,
        )
        .bind(&book.book_id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.publish_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(not_found)
    }

    async fn delete(&self, book_id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// In-process catalog without persistence
#[derive(Default)]
pub struct MemoryBookStore {
    books: Mutex<BTreeMap<String, Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, BTreeMap<String, Book>>> {
        self.books
            .lock()
            .map_err(|_| AppError::Internal("Book store lock poisoned".to_string()))
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn get_by_id(&self, book_id: &str) -> AppResult<Book> {
        self.lock()?.get(book_id).cloned().ok_or_else(not_found)
    }

    async fn list(&self) -> AppResult<Vec<Book>> {
        Ok(self.lock()?.values().cloned().collect())
    }

    async fn create(&self, book: &Book) -> AppResult<Book> {
        let mut books = self.lock()?;
        if books.contains_key(&book.book_id) {
            return Err(AppError::Conflict(already_exists(&book.book_id)));
        }
        books.insert(book.book_id.clone(), book.clone());
        Ok(book.clone())
    }

    async fn update(&self, book: &Book) -> AppResult<Book> {
        let mut books = self.lock()?;
        let stored = books.get_mut(&book.book_id).ok_or_else(not_found)?;
        *stored = book.clone();
        Ok(book.clone())
    }

    async fn delete(&self, book_id: &str) -> AppResult<()> {
        self.lock()?.remove(book_id).map(|_| ()).ok_or_else(not_found)
    }

    async fn ping(&self) -> AppResult<()> {
        self.lock().map(|_| ())
    }
}
