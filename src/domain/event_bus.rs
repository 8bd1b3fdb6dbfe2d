//! Broadcast channel for sync events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Every
//! synchronizer publishes a [`SyncEvent`] through the bus, and all
//! WebSocket connections subscribe to receive filtered events.

use tokio::sync::broadcast;

use super::SyncEvent;

/// Broadcast bus for [`SyncEvent`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity
/// (default 10 000). When the ring buffer is full, the oldest events are
/// dropped for lagging receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to every connected dashboard.
    ///
    /// Returns the number of receivers reached; with none connected the
    /// event is dropped.
    pub fn publish(&self, event: SyncEvent) -> usize {
        let event_type = event.event_type_str();
        let receivers = self.sender.send(event).unwrap_or(0);
        tracing::trace!(event_type, receivers, "sync event published");
        receivers
    }

    /// Creates a new receiver that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
