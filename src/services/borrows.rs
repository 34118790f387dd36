//! Borrow request processing and ledger administration

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::borrow::{BorrowCount, BorrowRecord, BorrowRequest},
    repository::BorrowLedgerStore,
};

use super::existence::ExistenceCheck;

/// What happened to a single borrow request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorrowOutcome {
    /// A record was appended to the ledger
    Recorded,
    /// The body could not be parsed; the message is dropped
    MalformedPayload(String),
    UnknownStudent,
    UnknownBook,
    /// The student already holds `count` records
    LimitReached { count: i64 },
    /// Unexpected failure while processing; the message is dropped
    Failed(String),
}

impl BorrowOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, BorrowOutcome::Recorded)
    }
}

#[derive(Clone)]
pub struct BorrowsService {
    ledger: Arc<dyn BorrowLedgerStore>,
    students: Arc<dyn ExistenceCheck>,
    books: Arc<dyn ExistenceCheck>,
    borrow_limit: i64,
}

impl BorrowsService {
    pub fn new(
        ledger: Arc<dyn BorrowLedgerStore>,
        students: Arc<dyn ExistenceCheck>,
        books: Arc<dyn ExistenceCheck>,
        borrow_limit: i64,
    ) -> Self {
        Self {
            ledger,
            students,
            books,
            borrow_limit,
        }
    }

    /// Process a raw queue message body. Never fails: every error is
    /// folded into the returned outcome so the caller can always ack.
    pub async fn process_message(&self, body: &[u8]) -> BorrowOutcome {
        let request = match BorrowRequest::from_slice(body) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(error = %e, "Dropping malformed borrow request");
                return BorrowOutcome::MalformedPayload(e.to_string());
            }
        };

        self.process_request(request).await
    }

    /// Validate a parsed request and record it if the student is under the limit
    pub async fn process_request(&self, request: BorrowRequest) -> BorrowOutcome {
        tracing::info!(
            student_id = %request.student_id,
            book_id = %request.book_id,
            "Received borrow request"
        );

        match self.try_record(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Error processing borrow request");
                BorrowOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_record(&self, request: BorrowRequest) -> AppResult<BorrowOutcome> {
        if !self.students.exists(&request.student_id).await {
            tracing::error!(student_id = %request.student_id, "Student does not exist");
            return Ok(BorrowOutcome::UnknownStudent);
        }

        if !self.books.exists(&request.book_id).await {
            tracing::error!(book_id = %request.book_id, "Book does not exist");
            return Ok(BorrowOutcome::UnknownBook);
        }

        // Count and insert are separate statements; see repository::borrows.
        let count = self.ledger.count_by_student(&request.student_id).await?;
        tracing::info!(
            student_id = %request.student_id,
            borrowed_count = count,
            "Current borrow count"
        );

        if count >= self.borrow_limit {
            tracing::warn!(
                student_id = %request.student_id,
                borrowed_count = count,
                limit = self.borrow_limit,
                "Borrow request denied: borrowing limit reached"
            );
            return Ok(BorrowOutcome::LimitReached { count });
        }

        let record = request.into_record();
        self.ledger.insert(&record).await?;
        tracing::info!(
            student_id = %record.student_id,
            book_id = %record.book_id,
            "Borrow request processed"
        );

        Ok(BorrowOutcome::Recorded)
    }

    /// Every borrow record
    pub async fn list_all(&self) -> AppResult<Vec<BorrowRecord>> {
        self.ledger.list_all().await.map_err(|e| {
            tracing::error!(error = %e, "Error fetching borrowed books");
            AppError::Internal("Failed to fetch borrowed books".to_string())
        })
    }

    /// Delete every borrow record, returning the number removed
    pub async fn clear_all(&self) -> AppResult<u64> {
        let removed = self.ledger.delete_all().await.map_err(|e| {
            AppError::Internal(format!("Failed to delete borrowed book records: {}", e))
        })?;
        tracing::info!(removed, "Cleared borrow ledger");
        Ok(removed)
    }

    /// Ledger reachability, for the readiness check
    pub async fn ping(&self) -> AppResult<()> {
        self.ledger.ping().await
    }

    /// Count used by the limit check, for external verification
    pub async fn count_for_student(&self, student_id: &str) -> AppResult<BorrowCount> {
        let borrowed_count = self.ledger.count_by_student(student_id).await?;
        Ok(BorrowCount {
            student_id: student_id.to_string(),
            borrowed_count,
        })
    }
}
