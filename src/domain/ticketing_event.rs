//! Domain events reflecting ticketing state mutations.
//!
//! Every state change emits a [`TicketingEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers and
//! optionally appended to the PostgreSQL log.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::tier::TierKind;
use super::{AccountId, EventId, PurchaseId};

/// Domain event emitted after every state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum TicketingEvent {
    /// Emitted when an organizer creates an event.
    EventCreated {
        /// Event identifier.
        event_id: EventId,
        /// Owning organizer.
        organizer_id: AccountId,
        /// Event name.
        name: String,
        /// Total tickets across tiers.
        capacity: u32,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a successful purchase.
    TicketsPurchased {
        /// Event identifier.
        event_id: EventId,
        /// Purchase identifier.
        purchase_id: PurchaseId,
        /// Tier bought.
        tier: TierKind,
        /// Number of tickets.
        quantity: u32,
        /// Tickets left in the tier.
        remaining: u32,
        /// Event inventory version after the purchase.
        version: u64,
        /// Purchase timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a refund put tickets back on sale.
    PurchaseRefunded {
        /// Event identifier.
        event_id: EventId,
        /// Purchase identifier.
        purchase_id: PurchaseId,
        /// Tier refunded.
        tier: TierKind,
        /// Number of tickets returned.
        quantity: u32,
        /// Tickets left in the tier after the refund.
        remaining: u32,
        /// Event inventory version after the refund.
        version: u64,
        /// Refund timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when the last ticket of a tier is sold.
    TierSoldOut {
        /// Event identifier.
        event_id: EventId,
        /// Tier that sold out.
        tier: TierKind,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted the first time gross revenue covers the event's target.
    BreakEvenReached {
        /// Event identifier.
        event_id: EventId,
        /// Gross revenue at that moment.
        gross_revenue: Decimal,
        /// Configured target.
        target: Decimal,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl TicketingEvent {
    /// Returns the event ID associated with this domain event.
    #[must_use]
    pub fn event_id(&self) -> EventId {
        match self {
            Self::EventCreated { event_id, .. }
            | Self::TicketsPurchased { event_id, .. }
            | Self::PurchaseRefunded { event_id, .. }
            | Self::TierSoldOut { event_id, .. }
            | Self::BreakEvenReached { event_id, .. } => *event_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::EventCreated { .. } => "event_created",
            Self::TicketsPurchased { .. } => "tickets_purchased",
            Self::PurchaseRefunded { .. } => "purchase_refunded",
            Self::TierSoldOut { .. } => "tier_sold_out",
            Self::BreakEvenReached { .. } => "break_even_reached",
        }
    }
}
