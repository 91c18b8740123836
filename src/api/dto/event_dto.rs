//! Event creation, listing and dashboard DTOs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::coerce;
use super::common_dto::PaginationMeta;
use crate::domain::{AccountId, Event, EventId, EventSummary, NewEvent, TicketTier, TierKind, TierSpec};
use crate::error::TicketingError;
use crate::service::{EventDashboard, PublicEvent};

/// Request body for `POST /api/events`.
///
/// Counts, prices and target accept JSON numbers or numeric strings; blank
/// or missing values count as zero.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// Event name.
    #[serde(default, alias = "eventName")]
    pub name: Option<String>,
    /// Venue.
    #[serde(default)]
    pub venue: Option<String>,
    /// Event date: RFC 3339, `YYYY-MM-DDTHH:MM` or `YYYY-MM-DD`.
    #[serde(default)]
    pub date: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Break-even revenue target.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub target: Option<Value>,
    /// Number of VIP tickets.
    #[serde(default, alias = "vipTickets")]
    #[schema(value_type = Option<u32>)]
    pub vip_tickets: Option<Value>,
    /// VIP ticket price.
    #[serde(default, alias = "vipTicketPrice", alias = "priceVIP")]
    #[schema(value_type = Option<String>)]
    pub vip_ticket_price: Option<Value>,
    /// Number of general tickets.
    #[serde(default, alias = "generalTickets")]
    #[schema(value_type = Option<u32>)]
    pub general_tickets: Option<Value>,
    /// General ticket price.
    #[serde(default, alias = "generalTicketPrice", alias = "priceGeneral")]
    #[schema(value_type = Option<String>)]
    pub general_ticket_price: Option<Value>,
    /// Number of early-bird tickets.
    #[serde(default, alias = "earlyBirdTickets")]
    #[schema(value_type = Option<u32>)]
    pub early_bird_tickets: Option<Value>,
    /// Early-bird ticket price.
    #[serde(default, alias = "earlyBirdTicketPrice", alias = "priceEarlyBird")]
    #[schema(value_type = Option<String>)]
    pub early_bird_ticket_price: Option<Value>,
}

impl CreateEventRequest {
    /// Validates and coerces the form fields.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InvalidRequest`] with "Missing required
    /// fields" when name, venue or date is absent, or a field-specific
    /// message for unparseable numbers and dates.
    pub fn into_new_event(self) -> Result<NewEvent, TicketingError> {
        let name = self.name.unwrap_or_default();
        let venue = self.venue.unwrap_or_default();
        let has_date = self.date.as_deref().is_some_and(|d| !d.trim().is_empty());
        if name.trim().is_empty() || venue.trim().is_empty() || !has_date {
            return Err(TicketingError::InvalidRequest("Missing required fields".to_string()));
        }
        let Some(date) = coerce::date("date", self.date.as_deref())? else {
            return Err(TicketingError::InvalidRequest("Missing required fields".to_string()));
        };
        Ok(NewEvent {
            name,
            venue,
            date,
            description: self.description,
            target: coerce::amount("target", self.target.as_ref())?,
            vip: TierSpec {
                price: coerce::amount("vip_ticket_price", self.vip_ticket_price.as_ref())?,
                quantity: coerce::count("vip_tickets", self.vip_tickets.as_ref())?,
            },
            general: TierSpec {
                price: coerce::amount("general_ticket_price", self.general_ticket_price.as_ref())?,
                quantity: coerce::count("general_tickets", self.general_tickets.as_ref())?,
            },
            early_bird: TierSpec {
                price: coerce::amount(
                    "early_bird_ticket_price",
                    self.early_bird_ticket_price.as_ref(),
                )?,
                quantity: coerce::count("early_bird_tickets", self.early_bird_tickets.as_ref())?,
            },
        })
    }
}

/// Minimal event view returned after creation.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedEventDto {
    /// Event identifier.
    pub id: EventId,
    /// Event name.
    pub name: String,
    /// Event date.
    pub date: DateTime<Utc>,
    /// Venue.
    pub venue: String,
}

/// Response body for `POST /api/events`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateEventResponse {
    /// Confirmation text.
    pub message: String,
    /// The created event.
    pub event: CreatedEventDto,
}

impl From<&Event> for CreateEventResponse {
    fn from(event: &Event) -> Self {
        Self {
            message: "Event created successfully".to_string(),
            event: CreatedEventDto {
                id: event.id,
                name: event.name.clone(),
                date: event.date,
                venue: event.venue.clone(),
            },
        }
    }
}

/// One tier's price and inventory.
#[derive(Debug, Serialize, ToSchema)]
pub struct TierDto {
    /// Tier kind.
    #[serde(rename = "type")]
    pub kind: TierKind,
    /// Unit price.
    pub price: Decimal,
    /// Tickets configured.
    pub capacity: u32,
    /// Tickets still for sale.
    pub available: u32,
    /// Tickets sold.
    pub sold: u32,
}

impl From<&TicketTier> for TierDto {
    fn from(tier: &TicketTier) -> Self {
        Self {
            kind: tier.kind,
            price: tier.price,
            capacity: tier.capacity,
            available: tier.available,
            sold: tier.sold(),
        }
    }
}

fn tiers(tiers: &[TicketTier]) -> Vec<TierDto> {
    tiers.iter().map(TierDto::from).collect()
}

/// Event entry in the organizer's own list.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventListItemDto {
    /// Event identifier.
    pub id: EventId,
    /// Event name.
    pub name: String,
    /// Event date.
    pub date: DateTime<Utc>,
    /// Venue.
    pub venue: String,
    /// Tier inventory.
    pub tickets: Vec<TierDto>,
}

impl From<&EventSummary> for EventListItemDto {
    fn from(summary: &EventSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name.clone(),
            date: summary.date,
            venue: summary.venue.clone(),
            tickets: tiers(&summary.tiers),
        }
    }
}

/// Organizer contact shown on public listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrganizerDto {
    /// Organizer name.
    pub name: String,
    /// Organizer email.
    pub email: String,
}

/// Event entry in the public catalogue.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicEventDto {
    /// Event identifier.
    pub id: EventId,
    /// Event name.
    pub name: String,
    /// Event date.
    pub date: DateTime<Utc>,
    /// Venue.
    pub venue: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Tier inventory.
    pub tickets: Vec<TierDto>,
    /// Organizer contact, if the account still exists.
    pub organizer: Option<OrganizerDto>,
}

impl From<PublicEvent> for PublicEventDto {
    fn from(entry: PublicEvent) -> Self {
        let PublicEvent { summary, organizer } = entry;
        Self {
            id: summary.id,
            tickets: tiers(&summary.tiers),
            name: summary.name,
            date: summary.date,
            venue: summary.venue,
            description: summary.description,
            organizer: organizer.map(|c| OrganizerDto {
                name: c.name,
                email: c.email,
            }),
        }
    }
}

/// Paginated response for `GET /api/events/public`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicEventListResponse {
    /// Events on this page.
    pub data: Vec<PublicEventDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Full event detail.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventDetailDto {
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
    /// Free-text description.
    pub description: Option<String>,
    /// Break-even revenue target.
    pub target: Decimal,
    /// Tier inventory.
    pub tickets: Vec<TierDto>,
    /// Tickets configured across tiers.
    pub capacity: u32,
    /// Tickets sold across tiers.
    pub tickets_sold: u32,
    /// Inventory version, bumped on every sale or refund.
    pub version: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last inventory change.
    pub updated_at: DateTime<Utc>,
}

impl From<&Event> for EventDetailDto {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            organizer_id: event.organizer_id,
            name: event.name.clone(),
            venue: event.venue.clone(),
            date: event.date,
            description: event.description.clone(),
            target: event.target,
            tickets: tiers(&event.tiers),
            capacity: event.capacity(),
            tickets_sold: event.tickets_sold(),
            version: event.version,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// Per-tier sales card on the dashboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct TierSalesDto {
    /// Tier kind.
    #[serde(rename = "type")]
    pub kind: TierKind,
    /// Tickets sold.
    pub sold: u32,
    /// Tickets still for sale.
    pub available: u32,
    /// Tickets configured.
    pub capacity: u32,
    /// Revenue from this tier.
    pub revenue: Decimal,
}

/// Response body for `GET /api/events/{id}/dashboard`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    /// Event identifier.
    pub event_id: EventId,
    /// Event name.
    pub name: String,
    /// Event date.
    pub date: DateTime<Utc>,
    /// Per-tier sales.
    pub tiers: Vec<TierSalesDto>,
    /// Tickets sold across tiers.
    pub tickets_sold: u32,
    /// Tickets configured across tiers.
    pub capacity: u32,
    /// Revenue from all tickets sold.
    pub gross_revenue: Decimal,
    /// Break-even target.
    pub target: Decimal,
    /// Gross revenue over target in basis points, capped at 10 000.
    pub break_even_progress_bps: u32,
    /// Whether revenue covers the target.
    pub break_even_reached: bool,
    /// Purchases in effect.
    pub completed_purchases: usize,
    /// Refunded purchases.
    pub refunded_purchases: usize,
    /// Inventory version.
    pub version: u64,
}

impl From<&EventDashboard> for DashboardResponse {
    fn from(dashboard: &EventDashboard) -> Self {
        let event = &dashboard.event;
        Self {
            event_id: event.id,
            name: event.name.clone(),
            date: event.date,
            tiers: event
                .tiers
                .iter()
                .map(|t| TierSalesDto {
                    kind: t.kind,
                    sold: t.sold(),
                    available: t.available,
                    capacity: t.capacity,
                    revenue: t.revenue(),
                })
                .collect(),
            tickets_sold: event.tickets_sold(),
            capacity: event.capacity(),
            gross_revenue: event.gross_revenue(),
            target: event.target,
            break_even_progress_bps: event.break_even_progress_bps(),
            break_even_reached: event.break_even_reached(),
            completed_purchases: dashboard.completed_purchases,
            refunded_purchases: dashboard.refunded_purchases,
            version: event.version,
        }
    }
}
