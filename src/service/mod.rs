//! Service layer: business logic orchestration.
//!
//! [`AccountService`] handles registration, login and bearer tokens.
//! [`TicketService`] coordinates events, purchases and refunds and emits
//! events through the [`super::domain::EventBus`].

pub mod account_service;
pub mod ticket_service;

pub use account_service::{AccountService, Registration};
pub use ticket_service::{
    EventDashboard, OrganizerContact, PublicEvent, PurchaseOutcome, PurchaseRequest,
    StateSnapshot, TicketService,
};
