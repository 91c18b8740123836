//! Purchase records: the audit trail of every ticket sale.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::tier::TierKind;
use super::{AccountId, EventId, PurchaseId};
use crate::error::TicketingError;

/// Largest quantity accepted in one purchase.
pub const MAX_TICKETS_PER_PURCHASE: u32 = 50;

/// Lifecycle state of a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    /// Tickets issued.
    Completed,
    /// Tickets returned to inventory.
    Refunded,
}

/// One completed (or later refunded) ticket purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    /// Purchase identifier.
    pub id: PurchaseId,
    /// Buyer.
    pub account_id: AccountId,
    /// Event bought into.
    pub event_id: EventId,
    /// Tier bought.
    pub tier: TierKind,
    /// Number of tickets.
    pub quantity: u32,
    /// Tier price at the time of sale.
    pub unit_price: Decimal,
    /// `unit_price * quantity`.
    pub total: Decimal,
    /// Client-supplied retry key, if any.
    pub idempotency_key: Option<String>,
    /// Current status.
    pub status: PurchaseStatus,
    /// Sale timestamp.
    pub created_at: DateTime<Utc>,
    /// Refund timestamp.
    pub refunded_at: Option<DateTime<Utc>>,
}

impl Purchase {
    /// Builds a completed purchase record.
    #[must_use]
    pub fn completed(
        account_id: AccountId,
        event_id: EventId,
        tier: TierKind,
        quantity: u32,
        unit_price: Decimal,
        idempotency_key: Option<String>,
    ) -> Self {
        Self {
            id: PurchaseId::new(),
            account_id,
            event_id,
            tier,
            quantity,
            unit_price,
            total: unit_price * Decimal::from(quantity),
            idempotency_key,
            status: PurchaseStatus::Completed,
            created_at: Utc::now(),
            refunded_at: None,
        }
    }

    /// Marks the purchase refunded.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::AlreadyRefunded`] on a second refund.
    pub fn mark_refunded(&mut self) -> Result<(), TicketingError> {
        if self.status == PurchaseStatus::Refunded {
            return Err(TicketingError::AlreadyRefunded(*self.id.as_uuid()));
        }
        self.status = PurchaseStatus::Refunded;
        self.refunded_at = Some(Utc::now());
        Ok(())
    }

    /// `true` if a request for `event_id`/`tier`/`quantity` asks for the same
    /// thing as this purchase. Tells a genuine retry apart from a reused
    /// idempotency key.
    #[must_use]
    pub fn matches_request(&self, event_id: EventId, tier: TierKind, quantity: u32) -> bool {
        self.event_id == event_id && self.tier == tier && self.quantity == quantity
    }
}

/// Checks a requested quantity against the per-purchase bounds.
///
/// # Errors
///
/// Returns [`TicketingError::InvalidQuantity`] for zero or more than
/// [`MAX_TICKETS_PER_PURCHASE`].
pub fn validate_quantity(quantity: u32) -> Result<u32, TicketingError> {
    if quantity == 0 || quantity > MAX_TICKETS_PER_PURCHASE {
        Err(TicketingError::InvalidQuantity(quantity))
    } else {
        Ok(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase() -> Purchase {
        Purchase::completed(
            AccountId::new(),
            EventId::new(),
            TierKind::Vip,
            3,
            Decimal::new(1999, 2),
            Some("retry-1".to_string()),
        )
    }

    #[test]
    fn total_is_price_times_quantity() {
        assert_eq!(purchase().total, Decimal::new(5997, 2));
    }

    #[test]
    fn refund_twice_fails() {
        let mut p = purchase();
        assert!(p.mark_refunded().is_ok());
        assert!(p.refunded_at.is_some());
        assert!(matches!(
            p.mark_refunded(),
            Err(TicketingError::AlreadyRefunded(_))
        ));
    }

    #[test]
    fn quantity_bounds() {
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_TICKETS_PER_PURCHASE).is_ok());
        assert!(validate_quantity(MAX_TICKETS_PER_PURCHASE + 1).is_err());
    }

    #[test]
    fn matches_request_compares_payload() {
        let p = purchase();
        assert!(p.matches_request(p.event_id, TierKind::Vip, 3));
        assert!(!p.matches_request(p.event_id, TierKind::Vip, 2));
        assert!(!p.matches_request(EventId::new(), TierKind::Vip, 3));
    }
}
