//! Ticket tiers: the three ticket categories every event sells.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::error::TicketingError;

/// Ticket category.
///
/// Serialized as `vip`, `general` or `early_bird`. Parsing is lenient so
/// the display names used by the clients (`"VIP"`, `"Early Bird"`) are
/// accepted as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    /// VIP tickets.
    Vip,
    /// General admission.
    General,
    /// Discounted early-bird tickets.
    EarlyBird,
}

impl TierKind {
    /// Every tier, in display order.
    pub const ALL: [Self; 3] = [Self::Vip, Self::General, Self::EarlyBird];

    /// Returns the canonical wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vip => "vip",
            Self::General => "general",
            Self::EarlyBird => "early_bird",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TierKind {
    type Err = TicketingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "vip" => Ok(Self::Vip),
            "general" => Ok(Self::General),
            "earlybird" => Ok(Self::EarlyBird),
            _ => Err(TicketingError::InvalidTier(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for TierKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Price and inventory of one tier of an event.
///
/// `available` never exceeds `capacity`; the difference is the number of
/// tickets currently sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TicketTier {
    /// Which tier this is.
    pub kind: TierKind,
    /// Unit price.
    pub price: Decimal,
    /// Tickets configured at event creation.
    pub capacity: u32,
    /// Tickets still for sale.
    pub available: u32,
}

impl TicketTier {
    /// Creates a fully available tier.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InvalidRequest`] if `price` is negative.
    pub fn new(kind: TierKind, price: Decimal, capacity: u32) -> Result<Self, TicketingError> {
        if price.is_sign_negative() && !price.is_zero() {
            return Err(TicketingError::InvalidRequest(format!(
                "{kind} price must not be negative"
            )));
        }
        Ok(Self {
            kind,
            price,
            capacity,
            available: capacity,
        })
    }

    /// Number of tickets sold.
    #[must_use]
    pub const fn sold(&self) -> u32 {
        self.capacity.saturating_sub(self.available)
    }

    /// Returns `true` when nothing is left to sell.
    #[must_use]
    pub const fn is_sold_out(&self) -> bool {
        self.available == 0
    }

    /// Revenue from the tickets sold so far.
    #[must_use]
    pub fn revenue(&self) -> Decimal {
        self.price * Decimal::from(self.sold())
    }

    /// Takes `quantity` tickets out of the available pool.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InsufficientTickets`] when fewer than
    /// `quantity` tickets are available. The tier is left untouched.
    pub fn reserve(&mut self, quantity: u32) -> Result<(), TicketingError> {
        match self.available.checked_sub(quantity) {
            Some(left) => {
                self.available = left;
                Ok(())
            }
            None => Err(TicketingError::InsufficientTickets {
                tier: self.kind.to_string(),
                requested: quantity,
                available: self.available,
            }),
        }
    }

    /// Returns `quantity` tickets to the available pool.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Internal`] if the release would push
    /// `available` above `capacity`, which means the books are inconsistent.
    pub fn release(&mut self, quantity: u32) -> Result<(), TicketingError> {
        match self.available.checked_add(quantity) {
            Some(restored) if restored <= self.capacity => {
                self.available = restored;
                Ok(())
            }
            _ => Err(TicketingError::Internal(format!(
                "releasing {quantity} {} tickets exceeds capacity {}",
                self.kind, self.capacity
            ))),
        }
    }
}
