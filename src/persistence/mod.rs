//! Persistence layer: PostgreSQL ticketing log and state snapshots.
//!
//! Optional (`PERSISTENCE_ENABLED`). In-memory stores stay the source of
//! truth; PostgreSQL receives an append-only log of domain events and
//! periodic JSONB snapshots that are reloaded on startup.

pub mod models;
pub mod postgres;
pub mod recorder;

pub use postgres::PostgresPersistence;
