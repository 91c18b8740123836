//! Fan-out of [`TicketingEvent`]s to live listeners.
//!
//! The ticket service publishes after each committed sale, refund or event
//! creation. Listeners are WebSocket connections and, when persistence is
//! on, the ticketing log writer. A listener that falls more than the
//! channel capacity behind skips the oldest events.

use tokio::sync::broadcast;

use super::TicketingEvent;

/// Cloneable handle on the shared [`broadcast`] channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TicketingEvent>,
}

impl EventBus {
    /// Opens a channel holding up to `capacity` undelivered events per
    /// listener. A zero capacity is raised to 1.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Sends `event` to every current listener and returns how many there
    /// were. With no listeners the event is dropped.
    pub fn publish(&self, event: TicketingEvent) -> usize {
        let event_type = event.event_type_str();
        let event_id = event.event_id();
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::trace!(event_type, %event_id, delivered, "ticketing event published");
        delivered
    }

    /// New listener that sees every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TicketingEvent> {
        self.sender.subscribe()
    }

    /// Listeners currently attached.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
