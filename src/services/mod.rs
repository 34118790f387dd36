//! Business logic services

pub mod books;
pub mod borrows;
pub mod consumer;
pub mod existence;
pub mod reconnect;

use tokio::sync::watch;

/// Services behind the borrow service's HTTP surface
#[derive(Clone)]
pub struct Services {
    pub borrows: borrows::BorrowsService,
    pub consumer_state: watch::Receiver<consumer::ConsumerState>,
}

impl Services {
    pub fn new(
        borrows: borrows::BorrowsService,
        consumer_state: watch::Receiver<consumer::ConsumerState>,
    ) -> Self {
        Self {
            borrows,
            consumer_state,
        }
    }
}
