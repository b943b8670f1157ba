//! Broadcast bus distributing [`MessageEvent`] to multiple subscribers.
//!
//! Built on `tokio::sync::broadcast`. Publishing with no active
//! subscribers is a no-op. This is the realtime push channel: the
//! persistence adapter publishes after every durable insert, and both the
//! chat orchestrator and the WebSocket handler subscribe.

use fliza_types::event::MessageEvent;
use tokio::sync::broadcast;

/// Multi-consumer bus for message-store insert events.
///
/// Cloning the bus clones the sender, allowing multiple producers and
/// consumers.
pub struct MessageBus {
    sender: broadcast::Sender<MessageEvent>,
}

impl MessageBus {
    /// Create a new bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new subscriber that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<MessageEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no subscribers, the event is silently dropped.
    pub fn publish(&self, event: MessageEvent) {
        let _ = self.sender.send(event);
    }
}

impl Clone for MessageBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fliza_types::identity::UserId;
    use fliza_types::message::ChatMessage;

    fn sample_event(user: &str) -> MessageEvent {
        MessageEvent::Inserted {
            message: ChatMessage::optimistic(UserId::new(user), "hello"),
        }
    }

    #[tokio::test]
    async fn publish_and_subscribe_delivers_event() {
        let bus = MessageBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(sample_event("u-1"));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.user_id().as_str(), "u-1");
    }

    #[tokio::test]
    async fn multiple_subscribers_each_receive_event() {
        let bus = MessageBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(sample_event("u-1"));

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_does_not_panic() {
        let bus = MessageBus::new(16);
        bus.publish(sample_event("u-1"));
        bus.publish(sample_event("u-2"));
    }

    #[test]
    fn clone_shares_channel() {
        let bus = MessageBus::new(16);
        let bus2 = bus.clone();
        let mut rx = bus.subscribe();

        bus2.publish(sample_event("u-1"));
        assert!(rx.try_recv().is_ok());
    }
}
