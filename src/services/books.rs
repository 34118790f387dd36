//! Book catalog service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::AppResult,
    models::book::{Book, CreateBook, UpdateBook},
    repository::BookStore,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Arc<dyn BookStore>,
}

impl BooksService {
    pub fn new(repository: Arc<dyn BookStore>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()?;
        let created = self.repository.create(&Book::from(book)).await?;
        tracing::info!(book_id = %created.book_id, "Book created");
        Ok(created)
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.repository.list().await
    }

    pub async fn get(&self, book_id: &str) -> AppResult<Book> {
        self.repository.get_by_id(book_id).await
    }

    /// Apply a partial update; absent fields keep their stored value
    pub async fn update(&self, book_id: &str, update: UpdateBook) -> AppResult<Book> {
        update.validate()?;
        let mut book = self.repository.get_by_id(book_id).await?;
        book.apply(update);
        self.repository.update(&book).await
    }

    pub async fn delete(&self, book_id: &str) -> AppResult<()> {
        self.repository.delete(book_id).await?;
        tracing::info!(book_id, "Book deleted");
        Ok(())
    }

    /// Storage reachability, for the readiness check
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
