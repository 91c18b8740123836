//! Which events a WebSocket client follows.

use std::collections::HashSet;

use crate::domain::{EventId, TicketingEvent};

/// Most explicit event IDs one connection may follow.
pub const MAX_SUBSCRIPTIONS: usize = 64;

/// Event IDs followed by one connection, plus the `"*"` wildcard.
#[derive(Debug, Default)]
pub struct EventSubscriptions {
    followed: HashSet<EventId>,
    wildcard: bool,
}

impl EventSubscriptions {
    /// Creates an empty set that matches nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Follows `ids` and, if `wildcard`, every event. IDs beyond
    /// [`MAX_SUBSCRIPTIONS`] are not added and are returned.
    pub fn follow(&mut self, ids: &[EventId], wildcard: bool) -> Vec<EventId> {
        self.wildcard |= wildcard;
        let mut rejected = Vec::new();
        for id in ids {
            if self.followed.len() >= MAX_SUBSCRIPTIONS && !self.followed.contains(id) {
                rejected.push(*id);
            } else {
                self.followed.insert(*id);
            }
        }
        rejected
    }

    /// Stops following `ids`. `wildcard` clears the wildcard but keeps
    /// explicit IDs.
    pub fn unfollow(&mut self, ids: &[EventId], wildcard: bool) {
        if wildcard {
            self.wildcard = false;
        }
        for id in ids {
            self.followed.remove(id);
        }
    }

    /// `true` if `event` should be pushed to this client.
    #[must_use]
    pub fn wants(&self, event: &TicketingEvent) -> bool {
        self.wildcard || self.followed.contains(&event.event_id())
    }

    /// Number of explicitly followed events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.followed.len()
    }

    /// `true` if nothing is followed and the wildcard is off.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.followed.is_empty() && !self.wildcard
    }

    /// `true` while the wildcard is active.
    #[must_use]
    pub const fn is_wildcard(&self) -> bool {
        self.wildcard
    }
}
