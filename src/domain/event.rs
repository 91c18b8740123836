//! Ticketed event aggregate: metadata plus its three ticket tiers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::tier::{TicketTier, TierKind};
use super::{AccountId, EventId};
use crate::error::TicketingError;

/// Maximum length of free-text name and venue fields.
pub const MAX_TEXT_LEN: usize = 200;

/// Price and quantity requested for one tier at creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierSpec {
    /// Unit price.
    pub price: Decimal,
    /// Number of tickets to sell.
    pub quantity: u32,
}

/// Validated input for [`Event::create`].
#[derive(Debug, Clone)]
pub struct NewEvent {
    /// Event name.
    pub name: String,
    /// Venue name or address.
    pub venue: String,
    /// When the event takes place.
    pub date: DateTime<Utc>,
    /// Optional long description.
    pub description: Option<String>,
    /// Break-even revenue target.
    pub target: Decimal,
    /// VIP tier.
    pub vip: TierSpec,
    /// General admission tier.
    pub general: TierSpec,
    /// Early-bird tier.
    pub early_bird: TierSpec,
}

/// A ticketed event and its live inventory.
///
/// `tiers` always holds exactly one [`TicketTier`] per [`TierKind`], in
/// [`TierKind::ALL`] order. `version` increases on every inventory change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier (immutable after creation).
    pub id: EventId,
    /// Organizer account that owns the event.
    pub organizer_id: AccountId,
    /// Event name.
    pub name: String,
    /// Venue.
    pub venue: String,
    /// Event date.
    pub date: DateTime<Utc>,
    /// Optional description.
    pub description: Option<String>,
    /// Break-even revenue target.
    pub target: Decimal,
    /// Ticket tiers.
    pub tiers: Vec<TicketTier>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
    /// Inventory version counter.
    pub version: u64,
}

impl Event {
    /// Validates `input` and builds a new event owned by `organizer_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InvalidRequest`] when name or venue are
    /// blank or too long, or when the target or a price is negative.
    pub fn create(organizer_id: AccountId, input: NewEvent) -> Result<Self, TicketingError> {
        let name = input.name.trim().to_string();
        let venue = input.venue.trim().to_string();
        if name.is_empty() || venue.is_empty() {
            return Err(TicketingError::InvalidRequest(
                "Missing required fields".to_string(),
            ));
        }
        if name.chars().count() > MAX_TEXT_LEN || venue.chars().count() > MAX_TEXT_LEN {
            return Err(TicketingError::InvalidRequest(format!(
                "name and venue must be at most {MAX_TEXT_LEN} characters"
            )));
        }
        if input.target.is_sign_negative() && !input.target.is_zero() {
            return Err(TicketingError::InvalidRequest(
                "target must not be negative".to_string(),
            ));
        }

        let tiers = vec![
            TicketTier::new(TierKind::Vip, input.vip.price, input.vip.quantity)?,
            TicketTier::new(TierKind::General, input.general.price, input.general.quantity)?,
            TicketTier::new(
                TierKind::EarlyBird,
                input.early_bird.price,
                input.early_bird.quantity,
            )?,
        ];

        let description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let now = Utc::now();
        Ok(Self {
            id: EventId::new(),
            organizer_id,
            name,
            venue,
            date: input.date,
            description,
            target: input.target,
            tiers,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    /// Returns the tier of the given kind.
    #[must_use]
    pub fn tier(&self, kind: TierKind) -> Option<&TicketTier> {
        self.tiers.iter().find(|t| t.kind == kind)
    }

    fn tier_mut(&mut self, kind: TierKind) -> Result<&mut TicketTier, TicketingError> {
        self.tiers
            .iter_mut()
            .find(|t| t.kind == kind)
            .ok_or_else(|| TicketingError::InvalidTier(kind.to_string()))
    }

    /// Sells `quantity` tickets of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InsufficientTickets`] if the tier cannot
    /// cover the request; the event is unchanged in that case.
    pub fn reserve(&mut self, kind: TierKind, quantity: u32) -> Result<(), TicketingError> {
        self.tier_mut(kind)?.reserve(quantity)?;
        self.touch();
        Ok(())
    }

    /// Puts `quantity` tickets of `kind` back on sale.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Internal`] if that would exceed capacity.
    pub fn release(&mut self, kind: TierKind, quantity: u32) -> Result<(), TicketingError> {
        self.tier_mut(kind)?.release(quantity)?;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.version = self.version.saturating_add(1);
        self.updated_at = Utc::now();
    }

    /// Total tickets sold across tiers.
    #[must_use]
    pub fn tickets_sold(&self) -> u32 {
        self.tiers.iter().map(TicketTier::sold).sum()
    }

    /// Total tickets configured across tiers.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.tiers.iter().map(|t| t.capacity).sum()
    }

    /// Revenue from every ticket sold so far.
    #[must_use]
    pub fn gross_revenue(&self) -> Decimal {
        self.tiers.iter().map(TicketTier::revenue).sum()
    }

    /// `true` once gross revenue covers a positive target.
    #[must_use]
    pub fn break_even_reached(&self) -> bool {
        self.target > Decimal::ZERO && self.gross_revenue() >= self.target
    }

    /// Revenue as a fraction of target, in basis points, capped at 10 000.
    /// An event without a target reports 0.
    #[must_use]
    pub fn break_even_progress_bps(&self) -> u32 {
        if self.target <= Decimal::ZERO {
            return 0;
        }
        let ratio = self.gross_revenue() * Decimal::from(10_000) / self.target;
        ratio.min(Decimal::from(10_000)).trunc().to_u32().unwrap_or(10_000)
    }
}

/// Lightweight view of an event for list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    /// Event identifier.
    pub id: EventId,
    /// Owning organizer.
    pub organizer_id: AccountId,
    /// Event name.
    pub name: String,
    /// Venue.
    pub venue: String,
    /// Event date.
    pub date: DateTime<Utc>,
    /// Optional description.
    pub description: Option<String>,
    /// Current tier inventory.
    pub tiers: Vec<TicketTier>,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            organizer_id: event.organizer_id,
            name: event.name.clone(),
            venue: event.venue.clone(),
            date: event.date,
            description: event.description.clone(),
            tiers: event.tiers.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn new_event(vip: u32, general: u32, early_bird: u32) -> NewEvent {
        NewEvent {
            name: "Rooftop Sessions".to_string(),
            venue: "Pier 9".to_string(),
            date: Utc::now(),
            description: Some("  sunset set  ".to_string()),
            target: Decimal::from(500),
            vip: TierSpec {
                price: Decimal::from(100),
                quantity: vip,
            },
            general: TierSpec {
                price: Decimal::from(40),
                quantity: general,
            },
            early_bird: TierSpec {
                price: Decimal::from(25),
                quantity: early_bird,
            },
        }
    }

    fn event() -> Event {
        let Ok(event) = Event::create(AccountId::new(), new_event(5, 50, 20)) else {
            panic!("valid event");
        };
        event
    }

    #[test]
    fn create_builds_three_full_tiers() {
        let e = event();
        assert_eq!(e.tiers.len(), 3);
        for kind in TierKind::ALL {
            let Some(t) = e.tier(kind) else {
                panic!("missing tier {kind}");
            };
            assert_eq!(t.available, t.capacity);
        }
        assert_eq!(e.capacity(), 75);
        assert_eq!(e.description.as_deref(), Some("sunset set"));
    }

    #[test]
    fn blank_required_fields_rejected() {
        let mut input = new_event(1, 1, 1);
        input.venue = "   ".to_string();
        let Err(err) = Event::create(AccountId::new(), input) else {
            panic!("expected validation error");
        };
        assert!(err.to_string().contains("Missing required fields"));
    }

    #[test]
    fn reserve_bumps_version_and_revenue() {
        let mut e = event();
        assert!(e.reserve(TierKind::Vip, 2).is_ok());
        assert!(e.reserve(TierKind::General, 3).is_ok());
        assert_eq!(e.version, 2);
        assert_eq!(e.tickets_sold(), 5);
        assert_eq!(e.gross_revenue(), Decimal::from(320));
        assert!(!e.break_even_reached());
        assert_eq!(e.break_even_progress_bps(), 6_400);
    }

    #[test]
    fn failed_reserve_keeps_version() {
        let mut e = event();
        assert!(e.reserve(TierKind::Vip, 6).is_err());
        assert_eq!(e.version, 0);
        assert_eq!(e.tickets_sold(), 0);
    }

    #[test]
    fn break_even_caps_progress() {
        let mut e = event();
        assert!(e.reserve(TierKind::Vip, 5).is_ok());
        assert!(e.reserve(TierKind::General, 10).is_ok());
        assert!(e.break_even_reached());
        assert_eq!(e.break_even_progress_bps(), 10_000);
    }

    #[test]
    fn release_restores_inventory() {
        let mut e = event();
        assert!(e.reserve(TierKind::EarlyBird, 4).is_ok());
        assert!(e.release(TierKind::EarlyBird, 4).is_ok());
        assert_eq!(e.tickets_sold(), 0);
        assert!(e.release(TierKind::EarlyBird, 1).is_err());
    }
}
