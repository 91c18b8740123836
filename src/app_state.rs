//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::config::TicketingConfig;
use crate::domain::{AccountDirectory, EventBus, EventRegistry, PurchaseLedger};
use crate::service::{AccountService, TicketService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Registration, login and token checks.
    pub account_service: Arc<AccountService>,
    /// Events, purchases and refunds.
    pub ticket_service: Arc<TicketService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Builds empty in-memory stores and the services on top of them.
    #[must_use]
    pub fn from_config(config: &TicketingConfig) -> Self {
        let event_bus = EventBus::new(config.event_bus_capacity);
        let accounts = Arc::new(AccountDirectory::new());
        let tokens = TokenIssuer::new(config.jwt_secret.as_bytes(), config.jwt_ttl_secs);
        let account_service = Arc::new(AccountService::new(Arc::clone(&accounts), tokens));
        let ticket_service = Arc::new(TicketService::new(
            Arc::new(EventRegistry::new()),
            Arc::new(PurchaseLedger::new()),
            accounts,
            event_bus.clone(),
        ));
        Self {
            account_service,
            ticket_service,
            event_bus,
        }
    }
}
