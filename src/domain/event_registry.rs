//! Concurrent event storage with per-event fine-grained locking.
//!
//! [`EventRegistry`] stores all events in a `HashMap` where each entry is
//! individually protected by a [`tokio::sync::RwLock`]. Purchases on the
//! same event serialize on that event's write lock; purchases on
//! different events run concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::event::{Event, EventSummary};
use super::{AccountId, EventId};
use crate::error::TicketingError;

/// Central store for all events.
///
/// Uses a `RwLock<HashMap<...>>` for the outer map and per-entry
/// `Arc<RwLock<Event>>` for fine-grained per-event locking.
///
/// # Concurrency
///
/// - Multiple tasks may read the same event concurrently.
/// - Writes to different events are concurrent.
/// - Writes to the same event are serialized.
#[derive(Debug)]
pub struct EventRegistry {
    events: RwLock<HashMap<EventId, Arc<RwLock<Event>>>>,
}

impl EventRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new event.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InvalidRequest`] if an event with the same
    /// ID already exists (should never happen with UUID v4).
    pub async fn insert(&self, event: Event) -> Result<EventId, TicketingError> {
        let event_id = event.id;
        let mut map = self.events.write().await;
        if map.contains_key(&event_id) {
            return Err(TicketingError::InvalidRequest(format!(
                "event {event_id} already exists"
            )));
        }
        map.insert(event_id, Arc::new(RwLock::new(event)));
        Ok(event_id)
    }

    /// Returns the event behind its per-event lock.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::EventNotFound`] if no event has this ID.
    pub async fn get(&self, event_id: EventId) -> Result<Arc<RwLock<Event>>, TicketingError> {
        let map = self.events.read().await;
        map.get(&event_id)
            .cloned()
            .ok_or(TicketingError::EventNotFound(*event_id.as_uuid()))
    }

    /// Returns summaries of all events, optionally limited to one
    /// organizer, ordered by event date.
    pub async fn list(&self, organizer: Option<AccountId>) -> Vec<EventSummary> {
        let map = self.events.read().await;
        let mut summaries = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            let event = entry_lock.read().await;
            if organizer.is_some_and(|id| event.organizer_id != id) {
                continue;
            }
            summaries.push(EventSummary::from(&*event));
        }
        summaries.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        summaries
    }

    /// Handles on every event's lock, ordered by event ID.
    ///
    /// Callers that lock several entries must take them in this order.
    pub async fn entries(&self) -> Vec<Arc<RwLock<Event>>> {
        let map = self.events.read().await;
        let mut entries: Vec<(EventId, Arc<RwLock<Event>>)> = map
            .iter()
            .map(|(id, entry_lock)| (*id, Arc::clone(entry_lock)))
            .collect();
        entries.sort_by_key(|(id, _)| *id);
        entries.into_iter().map(|(_, entry_lock)| entry_lock).collect()
    }

    /// Loads events restored from persistence, replacing any entry with
    /// the same ID. Returns how many were loaded.
    pub async fn restore(&self, events: Vec<Event>) -> usize {
        let mut map = self.events.write().await;
        let count = events.len();
        for event in events {
            map.insert(event.id, Arc::new(RwLock::new(event)));
        }
        count
    }

    /// Returns the number of events in the registry.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Returns `true` if the registry contains no events.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}
