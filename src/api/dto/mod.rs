//! Data Transfer Objects for REST request/response serialization.
//!
//! Money amounts are serialized as JSON strings to keep exact cents.
//! Request bodies also accept the camelCase field names the web and mobile
//! clients send.

pub mod account_dto;
pub mod coerce;
pub mod common_dto;
pub mod event_dto;
pub mod purchase_dto;

pub use account_dto::*;
pub use common_dto::*;
pub use event_dto::*;
pub use purchase_dto::*;
