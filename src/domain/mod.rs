//! Domain layer: core types, in-memory stores, and the event system.
//!
//! This module contains the ticketing model (events, tiers, accounts,
//! purchases), the concurrent stores that hold it, and the event bus that
//! broadcasts state changes.

pub mod account;
pub mod account_directory;
pub mod event;
pub mod event_bus;
pub mod event_registry;
pub mod ids;
pub mod purchase;
pub mod purchase_ledger;
pub mod ticketing_event;
pub mod tier;

pub use account::{Account, NewAccount, Role, TicketHolding};
pub use account_directory::AccountDirectory;
pub use event::{Event, EventSummary, NewEvent, TierSpec};
pub use event_bus::EventBus;
pub use event_registry::EventRegistry;
pub use ids::{AccountId, EventId, PurchaseId};
pub use purchase::{MAX_TICKETS_PER_PURCHASE, Purchase, PurchaseStatus};
pub use purchase_ledger::{PurchaseLedger, Reservation};
pub use ticketing_event::TicketingEvent;
pub use tier::{TicketTier, TierKind};
