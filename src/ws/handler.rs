//! `GET /ws` upgrade endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;

/// Upgrades to a WebSocket that streams inventory changes for the events
/// the client follows.
///
/// The bus listener is attached before the upgrade completes, so nothing
/// published after the handshake is missed.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let events = state.event_bus.subscribe();
    let tickets = Arc::clone(&state.ticket_service);
    tracing::debug!(listeners = state.event_bus.receiver_count(), "ws client connecting");

    ws.on_upgrade(move |socket| run_connection(socket, events, tickets))
}
