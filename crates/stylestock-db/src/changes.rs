//! # Change Feed
//!
//! Broadcast channel carrying [`ChangeEvent`]s for every committed mutation.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Change Feed                                    │
//! │                                                                         │
//! │  ProductRepository ──┐                                                  │
//! │  SaleRepository    ──┼── publish(event) ──► broadcast::Sender           │
//! │  CustomerRepository──┤        (after commit only)    │                  │
//! │  MovementRepository──┘                               │                  │
//! │                                                      ▼                  │
//! │                               subscriber 1 (SSE stream, client A)       │
//! │                               subscriber 2 (SSE stream, client B)       │
//! │                               subscriber N ...                          │
//! │                                                                         │
//! │  Each event names only (entity, op, id). Subscribers re-fetch the      │
//! │  row they care about; the feed never carries row data itself.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Delivery Guarantees
//! - Events are published only after the owning transaction commits.
//!   A rolled-back write never appears on the feed.
//! - Slow subscribers that fall more than 256 events behind are lagged;
//!   they should drop the missed events and re-fetch current state.
//! - Publishing with zero subscribers is a no-op, not an error.

use stylestock_core::ChangeEvent;
use tokio::sync::broadcast;

/// Capacity of the broadcast channel. Subscribers further behind than this
/// receive a `Lagged` error on their next recv.
const FEED_CAPACITY: usize = 256;

/// Handle to the change broadcast channel.
///
/// Cheap to clone; all clones share the same underlying channel. One feed
/// is created per [`Database`](crate::Database) and handed to each
/// repository.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    /// Creates a new feed with no subscribers.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        ChangeFeed { tx }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// Must only be called after the mutation it describes has committed.
    /// Send errors (no active subscribers) are ignored.
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.tx.send(event);
    }

    /// Creates a new subscription.
    ///
    /// The receiver sees only events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stylestock_core::{ChangeOp, EntityKind};

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let feed = ChangeFeed::new();
        let mut rx = feed.subscribe();

        feed.publish(ChangeEvent::created(EntityKind::Product, "p1"));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.entity, EntityKind::Product);
        assert_eq!(event.op, ChangeOp::Created);
        assert_eq!(event.id, "p1");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let feed = ChangeFeed::new();
        // Must not panic or error
        feed.publish(ChangeEvent::deleted(EntityKind::Sale, "s1"));
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let feed = ChangeFeed::new();
        feed.publish(ChangeEvent::created(EntityKind::Customer, "c1"));

        let mut rx = feed.subscribe();
        feed.publish(ChangeEvent::updated(EntityKind::Customer, "c1"));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.op, ChangeOp::Updated);
        // Only the post-subscribe event is buffered
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_all_subscribers_see_every_event() {
        let feed = ChangeFeed::new();
        let mut rx_a = feed.subscribe();
        let mut rx_b = feed.subscribe();

        feed.publish(ChangeEvent::updated(EntityKind::Product, "p9"));

        assert_eq!(rx_a.recv().await.unwrap().id, "p9");
        assert_eq!(rx_b.recv().await.unwrap().id, "p9");
    }

    #[tokio::test]
    async fn test_lagged_subscriber_skips_and_catches_up() {
        let feed = ChangeFeed::new();
        let mut rx = feed.subscribe();

        // Overflow the buffer while the subscriber is not reading.
        for i in 0..(FEED_CAPACITY + 10) {
            feed.publish(ChangeEvent::created(
                EntityKind::StockMovement,
                format!("m{}", i),
            ));
        }

        // The first recv reports the skip count, then delivery resumes
        // from the oldest retained event. Publishers were never blocked.
        match rx.recv().await {
            Err(broadcast::error::RecvError::Lagged(missed)) => assert_eq!(missed, 10),
            other => panic!("expected lag, got {:?}", other),
        }
        assert_eq!(rx.recv().await.unwrap().id, "m10");
    }
}
