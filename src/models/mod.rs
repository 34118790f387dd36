//! Data models for the library services

pub mod book;
pub mod borrow;

// Re-export commonly used types
pub use book::{Book, CreateBook, UpdateBook};
pub use borrow::{BorrowCount, BorrowRecord, BorrowRequest, NewBorrowRecord};
