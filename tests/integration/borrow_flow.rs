//! Borrow-request processing from raw message to ledger

use std::sync::Arc;

use async_trait::async_trait;
use library_services::{
    error::AppResult,
    models::borrow::BorrowRecord,
    repository::{BorrowLedgerStore, MemoryBorrowLedger},
    services::{
        borrows::{BorrowOutcome, BorrowsService},
        consumer::{BorrowConsumer, Delivery},
        reconnect::ReconnectPolicy,
    },
};
use tokio::sync::Barrier;
use tokio_util::sync::CancellationToken;

use crate::common::{borrow_message, borrows_service, CountingAcker};

// Never connected: only `handle_delivery` is driven here.
fn consumer(service: BorrowsService) -> BorrowConsumer<library_services::services::consumer::AmqpBroker> {
    BorrowConsumer::new(
        library_services::services::consumer::AmqpBroker::new(Default::default()),
        service,
        ReconnectPolicy::default(),
        CancellationToken::new(),
    )
}

fn delivery(body: Vec<u8>, acker: &CountingAcker) -> Delivery<CountingAcker> {
    Delivery {
        tag: 1,
        redelivered: false,
        body,
        acker: acker.clone(),
    }
}

#[tokio::test]
async fn sixth_request_for_a_student_is_denied() {
    let ledger = Arc::new(MemoryBorrowLedger::new());
    let consumer = consumer(borrows_service(ledger.clone()));
    let acker = CountingAcker::default();

    let mut outcomes = Vec::new();
    for book in ["B1", "B2", "B3", "B4", "B5", "B6"] {
        let outcome = consumer
            .handle_delivery(delivery(borrow_message("S1", book), &acker))
            .await
            .unwrap();
        outcomes.push(outcome);
    }

    assert!(outcomes[..5].iter().all(BorrowOutcome::is_recorded));
    assert_eq!(outcomes[5], BorrowOutcome::LimitReached { count: 5 });
    assert_eq!(ledger.count_by_student("S1").await.unwrap(), 5);
    assert_eq!(acker.count(), 6);

    let books: Vec<String> = ledger
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.book_id)
        .collect();
    assert_eq!(books, vec!["B1", "B2", "B3", "B4", "B5"]);
}

#[tokio::test]
async fn denied_and_malformed_messages_are_acked_but_not_stored() {
    let ledger = Arc::new(MemoryBorrowLedger::new());
    let consumer = consumer(borrows_service(ledger.clone()));
    let acker = CountingAcker::default();

    let bodies = vec![
        borrow_message("S404", "B1"),
        borrow_message("S1", "B404"),
        br#"{"student_id": "S1", "book_id": "B1"}"#.to_vec(),
        b"\xff\xfe".to_vec(),
    ];

    for body in bodies {
        let outcome = consumer.handle_delivery(delivery(body, &acker)).await.unwrap();
        assert!(!outcome.is_recorded());
    }

    assert_eq!(acker.count(), 4);
    assert!(ledger.list_all().await.unwrap().is_empty());
}

/// Ledger whose count waits until two callers have both counted
struct RendezvousLedger {
    inner: MemoryBorrowLedger,
    barrier: Barrier,
}

#[async_trait]
impl BorrowLedgerStore for RendezvousLedger {
    async fn count_by_student(&self, student_id: &str) -> AppResult<i64> {
        let count = self.inner.count_by_student(student_id).await?;
        self.barrier.wait().await;
        Ok(count)
    }

    async fn insert(&self, record: &BorrowRecord) -> AppResult<()> {
        self.inner.insert(record).await
    }

    async fn list_all(&self) -> AppResult<Vec<BorrowRecord>> {
        self.inner.list_all().await
    }

    async fn delete_all(&self) -> AppResult<u64> {
        self.inner.delete_all().await
    }
}

/// The limit check is count-then-insert without a lock. Two concurrent
/// requests that both observe 4 records both insert, leaving 6.
#[tokio::test]
async fn concurrent_requests_can_exceed_the_limit() {
    let existing: Vec<BorrowRecord> = ["B1", "B2", "B3", "B4"]
        .iter()
        .map(|book| {
            serde_json::from_slice(&borrow_message("S1", book)).unwrap()
        })
        .collect();
    let ledger = Arc::new(RendezvousLedger {
        inner: MemoryBorrowLedger::with_records(existing),
        barrier: Barrier::new(2),
    });
    let service = borrows_service(ledger.clone());

    let first = serde_json::from_slice(&borrow_message("S1", "B5")).unwrap();
    let second = serde_json::from_slice(&borrow_message("S1", "B6")).unwrap();
    let (a, b) = tokio::join!(service.process_request(first), service.process_request(second));

    assert_eq!(a, BorrowOutcome::Recorded);
    assert_eq!(b, BorrowOutcome::Recorded);
    assert_eq!(ledger.inner.count_by_student("S1").await.unwrap(), 6);
}
