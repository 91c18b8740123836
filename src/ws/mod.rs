//! Live inventory feed over WebSocket.
//!
//! Clients connect to `/ws`, follow event IDs (or `"*"`) and receive
//! purchases, refunds, sell-outs and break-even notices as they happen.
//! They can also ask for an event's current tier availability.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
