//! Borrow record model and the queue message it is built from

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Borrow record as stored in `borrowed_books`
///
/// `date_returned` is always populated: a record describes a loan whose
/// return date is known at creation, there is no "currently out" state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub student_id: String,
    pub book_id: String,
    /// Date borrowed (YYYY-MM-DD)
    pub date_borrowed: NaiveDate,
    /// Date returned (YYYY-MM-DD)
    pub date_returned: NaiveDate,
}

/// Record about to be appended to the ledger
pub type NewBorrowRecord = BorrowRecord;

/// Borrow request message body consumed from the `borrow_book` queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BorrowRequest {
    pub student_id: String,
    pub book_id: String,
    pub date_borrowed: NaiveDate,
    pub date_returned: NaiveDate,
}

impl BorrowRequest {
    /// Parse a raw message body
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    pub fn into_record(self) -> NewBorrowRecord {
        BorrowRecord {
            student_id: self.student_id,
            book_id: self.book_id,
            date_borrowed: self.date_borrowed,
            date_returned: self.date_returned,
        }
    }
}

/// Current number of records held by a student
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowCount {
    pub student_id: String,
    pub borrowed_count: i64,
}
