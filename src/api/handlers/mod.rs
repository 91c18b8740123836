//! REST endpoint handlers organized by resource.

pub mod accounts;
pub mod events;
pub mod purchases;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(accounts::routes())
        .merge(events::routes())
        .merge(purchases::routes())
}
