//! # chillr-tickets
//!
//! REST API and WebSocket backend for Chillr event ticketing.
//!
//! Organizers register, publish events with VIP, general and early-bird
//! ticket tiers and watch sales on a dashboard. Attendees register, browse
//! the public catalogue, buy tickets and request refunds. Every tier's
//! inventory is guarded by its event's lock, so concurrent purchases
//! never oversell.
//!
//! ## Architecture
//!
//! ```text
//! Clients (web, mobile, WebSocket)
//!     │
//!     ├── REST Handlers (api/)      ── AuthUser extractor (auth/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── AccountService, TicketService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── EventRegistry, PurchaseLedger, AccountDirectory (domain/)
//!     │
//!     └── PostgreSQL log + snapshots (persistence/, optional)
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
