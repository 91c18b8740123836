//! Accounts: organizers who create events and attendees who buy tickets.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::tier::TierKind;
use super::{AccountId, EventId, PurchaseId};
use crate::error::TicketingError;

/// What an account is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Creates and manages events.
    Organizer,
    /// Buys tickets.
    Attendee,
}

impl Role {
    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Organizer => "organizer",
            Self::Attendee => "attendee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tickets an account holds from one purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TicketHolding {
    /// Purchase that produced the tickets.
    #[schema(value_type = uuid::Uuid)]
    pub purchase_id: PurchaseId,
    /// Event the tickets are for.
    #[schema(value_type = uuid::Uuid)]
    pub event_id: EventId,
    /// Tier bought.
    pub tier: TierKind,
    /// Number of tickets.
    pub quantity: u32,
}

/// Input for inserting a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Account role.
    pub role: Role,
    /// Display name.
    pub name: String,
    /// Login email, not yet normalized.
    pub email: String,
    /// Argon2 PHC hash of the password.
    pub password_hash: String,
    /// Age in years.
    pub age: Option<u32>,
    /// Free-form gender.
    pub gender: Option<String>,
    /// Home city.
    pub city: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier.
    pub id: AccountId,
    /// Account role.
    pub role: Role,
    /// Display name.
    pub name: String,
    /// Normalized login email (trimmed, lowercase).
    pub email: String,
    /// Argon2 PHC hash of the password.
    pub password_hash: String,
    /// Age in years.
    pub age: Option<u32>,
    /// Free-form gender.
    pub gender: Option<String>,
    /// Home city.
    pub city: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Ticket holdings in purchase order.
    pub tickets: Vec<TicketHolding>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Builds an account from validated input.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InvalidRequest`] for a blank name or a
    /// malformed email.
    pub fn create(input: NewAccount) -> Result<Self, TicketingError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(TicketingError::InvalidRequest("name is required".to_string()));
        }
        Ok(Self {
            id: AccountId::new(),
            role: input.role,
            name,
            email: normalize_email(&input.email)?,
            password_hash: input.password_hash,
            age: input.age,
            gender: blank_to_none(input.gender),
            city: blank_to_none(input.city),
            phone: blank_to_none(input.phone),
            tickets: Vec::new(),
            created_at: Utc::now(),
        })
    }

    /// Removes the holding produced by `purchase_id`. Returns `true` if one
    /// was removed.
    pub fn remove_holding(&mut self, purchase_id: PurchaseId) -> bool {
        let before = self.tickets.len();
        self.tickets.retain(|h| h.purchase_id != purchase_id);
        self.tickets.len() != before
    }
}

/// Trims and lowercases an email, rejecting obviously malformed input.
///
/// # Errors
///
/// Returns [`TicketingError::InvalidRequest`] unless the address has a
/// non-empty local part and a dotted domain.
pub fn normalize_email(raw: &str) -> Result<String, TicketingError> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if valid && !email.contains(char::is_whitespace) {
        Ok(email)
    } else {
        Err(TicketingError::InvalidRequest(format!(
            "invalid email address: {}",
            raw.trim()
        )))
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn input(email: &str) -> NewAccount {
        NewAccount {
            role: Role::Attendee,
            name: "Ada".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            age: Some(31),
            gender: Some(" ".to_string()),
            city: Some("Lagos".to_string()),
            phone: None,
        }
    }

    #[test]
    fn email_is_normalized() {
        let Ok(account) = Account::create(input("  Ada@Example.COM ")) else {
            panic!("valid account");
        };
        assert_eq!(account.email, "ada@example.com");
        assert_eq!(account.gender, None);
        assert_eq!(account.city.as_deref(), Some("Lagos"));
    }

    #[test]
    fn malformed_emails_rejected() {
        for bad in ["", "ada", "@example.com", "ada@example", "ada@.com", "a b@x.io"] {
            assert!(normalize_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn remove_holding_only_drops_matching_purchase() {
        let Ok(mut account) = Account::create(input("ada@example.com")) else {
            panic!("valid account");
        };
        let keep = PurchaseId::new();
        let drop_id = PurchaseId::new();
        for purchase_id in [keep, drop_id] {
            account.tickets.push(TicketHolding {
                purchase_id,
                event_id: EventId::new(),
                tier: TierKind::General,
                quantity: 1,
            });
        }
        assert!(account.remove_holding(drop_id));
        assert!(!account.remove_holding(drop_id));
        assert_eq!(account.tickets.len(), 1);
    }
}
