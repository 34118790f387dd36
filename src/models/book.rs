//! Book model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub book_id: String,
    pub title: String,
    pub author: String,
    /// Publish date (YYYY-MM-DD)
    pub publish_date: NaiveDate,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 20, message = "book_id must be 1 to 20 characters"))]
    pub book_id: String,
    #[validate(length(min = 1, max = 100, message = "title must be 1 to 100 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "author must be 1 to 100 characters"))]
    pub author: String,
    pub publish_date: NaiveDate,
}

/// Update book request, absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 100, message = "title must be 1 to 100 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100, message = "author must be 1 to 100 characters"))]
    pub author: Option<String>,
    pub publish_date: Option<NaiveDate>,
}

impl Book {
    pub fn apply(&mut self, update: UpdateBook) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(author) = update.author {
            self.author = author;
        }
        if let Some(publish_date) = update.publish_date {
            self.publish_date = publish_date;
        }
    }
}

impl From<CreateBook> for Book {
    fn from(book: CreateBook) -> Self {
        Self {
            book_id: book.book_id,
            title: book.title,
            author: book.author,
            publish_date: book.publish_date,
        }
    }
}
