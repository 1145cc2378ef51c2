//! "Transaction created" notifications
//!
//! One [`TransactionEvents`] channel is shared by everything that creates
//! transactions and everything that shows them. Each consumer holds its own
//! [`TransactionSubscription`]; dropping it unsubscribes. Events are not kept
//! for subscribers that join later.

use tokio::sync::broadcast;

/// Payload of a creation event
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionCreated {
    /// Id assigned by the backend
    pub id: i64,
}

/// Publish/subscribe channel for created transactions
#[derive(Debug, Clone)]
pub struct TransactionEvents {
    sender: broadcast::Sender<TransactionCreated>,
}

impl TransactionEvents {
    /// `capacity` is how many events a slow subscriber may fall behind
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Broadcast a creation; returns how many subscribers will see it
    pub fn notify_transaction_created(&self, id: i64) -> usize {
        match self.sender.send(TransactionCreated { id }) {
            Ok(receivers) => receivers,
            // No subscribers right now; nothing to deliver
            Err(_) => 0,
        }
    }

    pub fn subscribe(&self) -> TransactionSubscription {
        TransactionSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for TransactionEvents {
    fn default() -> Self {
        Self::new(16)
    }
}

/// One consumer's view of the channel
#[derive(Debug)]
pub struct TransactionSubscription {
    receiver: broadcast::Receiver<TransactionCreated>,
}

impl TransactionSubscription {
    /// Wait for the next event; `None` once the channel is closed.
    ///
    /// A subscriber that fell behind skips the missed events and carries on
    /// with the oldest one still buffered.
    pub async fn recv(&mut self) -> Option<TransactionCreated> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("Transaction event subscriber lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_subscriber_receives_each_event() {
        let events = TransactionEvents::new(4);
        let mut first = events.subscribe();
        let mut second = events.subscribe();

        assert_eq!(events.notify_transaction_created(7), 2);

        assert_eq!(first.recv().await, Some(TransactionCreated { id: 7 }));
        assert_eq!(second.recv().await, Some(TransactionCreated { id: 7 }));
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let events = TransactionEvents::new(4);
        assert_eq!(events.notify_transaction_created(1), 0);

        let mut late = events.subscribe();
        events.notify_transaction_created(2);
        assert_eq!(late.recv().await, Some(TransactionCreated { id: 2 }));
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let events = TransactionEvents::new(4);
        let subscription = events.subscribe();
        assert_eq!(events.subscriber_count(), 1);
        drop(subscription);
        assert_eq!(events.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_keeps_going() {
        let events = TransactionEvents::new(1);
        let mut slow = events.subscribe();
        events.notify_transaction_created(1);
        events.notify_transaction_created(2);

        assert_eq!(slow.recv().await, Some(TransactionCreated { id: 2 }));
    }

    #[tokio::test]
    async fn test_closed_channel_ends_subscription() {
        let events = TransactionEvents::new(1);
        let mut subscription = events.subscribe();
        drop(events);
        assert_eq!(subscription.recv().await, None);
    }
}
