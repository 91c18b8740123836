//! Purchase and refund DTOs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::coerce;
use crate::domain::{EventId, Purchase, PurchaseId, PurchaseStatus, TierKind};
use crate::error::TicketingError;
use crate::service::{PurchaseOutcome, PurchaseRequest};

/// Request body for `POST /api/purchase/buy`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BuyTicketsRequest {
    /// Event to buy from.
    #[serde(alias = "eventId")]
    pub event_id: uuid::Uuid,
    /// Tier name: `vip`, `general` or `early_bird` (case and separators
    /// are ignored).
    #[serde(rename = "type", alias = "tier")]
    pub tier: String,
    /// Number of tickets, 1 to 50.
    #[serde(default)]
    #[schema(value_type = u32)]
    pub quantity: Option<Value>,
    /// Must match the bearer token's account when present.
    #[serde(default, alias = "userId")]
    pub user_id: Option<uuid::Uuid>,
    /// Retry key. The `Idempotency-Key` header takes precedence.
    #[serde(default, alias = "idempotencyKey")]
    pub idempotency_key: Option<String>,
}

impl BuyTicketsRequest {
    /// Parses into a [`PurchaseRequest`], preferring `header_key` over the
    /// body's idempotency key.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InvalidTier`] for an unknown tier and
    /// [`TicketingError::InvalidRequest`] for a non-numeric quantity.
    pub fn into_purchase(self, header_key: Option<String>) -> Result<PurchaseRequest, TicketingError> {
        let tier: TierKind = self.tier.parse()?;
        let quantity = match self.quantity {
            None | Some(Value::Null) => 1,
            Some(ref value) => coerce::count("quantity", Some(value))?,
        };
        let idempotency_key = header_key
            .or(self.idempotency_key)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Ok(PurchaseRequest {
            event_id: EventId::from_uuid(self.event_id),
            tier,
            quantity,
            idempotency_key,
        })
    }
}

/// One purchase record.
#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseDto {
    /// Purchase identifier.
    pub id: PurchaseId,
    /// Event bought from.
    pub event_id: EventId,
    /// Tier bought.
    #[serde(rename = "type")]
    pub tier: TierKind,
    /// Number of tickets.
    pub quantity: u32,
    /// Price per ticket at purchase time.
    pub unit_price: Decimal,
    /// `unit_price * quantity`.
    pub total: Decimal,
    /// Completed or refunded.
    pub status: PurchaseStatus,
    /// Purchase timestamp.
    pub created_at: DateTime<Utc>,
    /// Refund timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_at: Option<DateTime<Utc>>,
}

impl From<&Purchase> for PurchaseDto {
    fn from(p: &Purchase) -> Self {
        Self {
            id: p.id,
            event_id: p.event_id,
            tier: p.tier,
            quantity: p.quantity,
            unit_price: p.unit_price,
            total: p.total,
            status: p.status,
            created_at: p.created_at,
            refunded_at: p.refunded_at,
        }
    }
}

/// Response body for `POST /api/purchase/buy`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BuyTicketsResponse {
    /// Confirmation text.
    pub message: String,
    /// `true` when an earlier request with the same key produced this
    /// purchase.
    pub replayed: bool,
    /// The purchase.
    pub purchase: PurchaseDto,
}

impl From<&PurchaseOutcome> for BuyTicketsResponse {
    fn from(outcome: &PurchaseOutcome) -> Self {
        Self {
            message: "Purchase successful".to_string(),
            replayed: outcome.replayed,
            purchase: PurchaseDto::from(&outcome.purchase),
        }
    }
}

/// Response body for `GET /api/user/purchases`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseListResponse {
    /// Purchases, oldest first.
    pub data: Vec<PurchaseDto>,
}
