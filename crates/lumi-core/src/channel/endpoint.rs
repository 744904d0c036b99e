//! In-process endpoint fanning events out to subscribers.

use std::sync::{Mutex, PoisonError};

use tokio::sync::{mpsc, watch};

use crate::error::{Error, Result};

use super::{EventEndpoint, QueuedEvent};

/// Fans events out to every subscriber.
///
/// Each subscriber owns an unbounded queue, so a drain of any size reaches
/// it in full. Each [`subscribe`](Self::subscribe) call is a connection: it
/// increments the connection counter that a bound channel listens to.
#[derive(Debug)]
pub struct BroadcastEndpoint {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<QueuedEvent>>>,
    connections: watch::Sender<usize>,
}

impl Default for BroadcastEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastEndpoint {
    /// Create an endpoint with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            connections: watch::Sender::new(0),
        }
    }

    /// Connect a new receiver.
    ///
    /// The receiver sees every event sent after this call, including a
    /// channel's queued events drained because of this connection.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<QueuedEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        self.connections.send_modify(|count| *count += 1);
        tracing::debug!("Event endpoint: subscriber connected");
        rx
    }

    /// Number of receivers currently attached.
    pub fn receiver_count(&self) -> usize {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.len()
    }
}

impl EventEndpoint for BroadcastEndpoint {
    fn send(&self, event: &QueuedEvent) -> Result<()> {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());

        if subscribers.is_empty() {
            return Err(Error::Internal(format!(
                "no subscriber for event '{}'",
                event.name
            )));
        }
        Ok(())
    }

    fn connections(&self) -> watch::Receiver<usize> {
        self.connections.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::channel::DeferredEventChannel;

    #[tokio::test]
    async fn test_subscriber_receives_queued_then_live_events() {
        let endpoint = Arc::new(BroadcastEndpoint::default());
        let channel = DeferredEventChannel::with_endpoint(endpoint.clone());

        channel.emit("first", vec![]);
        channel.emit("second", vec![]);

        let mut rx = endpoint.subscribe();
        let first = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("queued event delivered")
            .unwrap();
        assert_eq!(first.name, "first");
        assert_eq!(rx.recv().await.unwrap().name, "second");

        channel.emit("third", vec![]);
        assert_eq!(rx.recv().await.unwrap().name, "third");
    }

    #[tokio::test]
    async fn test_large_backlog_is_delivered_in_full() {
        let endpoint = Arc::new(BroadcastEndpoint::default());
        let channel = DeferredEventChannel::with_endpoint(endpoint.clone());

        for seq in 0..1000u64 {
            channel.emit("progress", vec![serde_json::json!(seq)]);
        }

        let mut rx = endpoint.subscribe();
        for seq in 0..1000u64 {
            let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .expect("queued event delivered")
                .unwrap();
            assert_eq!(event.payload[0], seq);
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_without_subscriber_fails() {
        let endpoint = BroadcastEndpoint::new();
        let err = endpoint.send(&QueuedEvent::new("lost", vec![])).unwrap_err();
        assert!(err.to_string().contains("lost"));
        assert_eq!(endpoint.receiver_count(), 0);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let endpoint = BroadcastEndpoint::new();
        let kept = endpoint.subscribe();
        drop(endpoint.subscribe());

        endpoint.send(&QueuedEvent::new("live", vec![])).unwrap();

        assert_eq!(endpoint.receiver_count(), 1);
        drop(kept);
        assert_eq!(endpoint.receiver_count(), 0);
    }

    #[tokio::test]
    async fn test_subscribe_counts_connections() {
        let endpoint = BroadcastEndpoint::new();
        let rx = endpoint.connections();
        let _a = endpoint.subscribe();
        let _b = endpoint.subscribe();
        assert_eq!(*rx.borrow(), 2);
    }
}
