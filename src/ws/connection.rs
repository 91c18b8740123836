//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, parse_event_ids};
use super::subscription::EventSubscriptions;
use crate::api::dto::TierDto;
use crate::domain::{EventId, TicketingEvent};
use crate::service::TicketService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<TicketingEvent>,
    ticket_service: Arc<TicketService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = EventSubscriptions::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, &mut subs, &ticket_service).await;
                        let Ok(json) = serde_json::to_string(&reply) else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "ws read failed");
                        break;
                    }
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(ticketing_event) => {
                        if !subs.wants(&ticketing_event) {
                            continue;
                        }
                        let payload = serde_json::to_value(&ticketing_event).unwrap_or_default();
                        let Ok(json) = serde_json::to_string(&WsMessage::event(payload)) else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles one text frame from the client and builds the reply.
async fn handle_text_message(
    text: &str,
    subs: &mut EventSubscriptions,
    ticket_service: &TicketService,
) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(String::new(), 400, "malformed JSON");
    };
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command");
    };

    match command {
        WsCommand::Subscribe { event_ids } => {
            let (ids, wildcard, invalid) = parse_event_ids(&event_ids);
            let rejected = subs.follow(&ids, wildcard);
            let subscribed: Vec<String> = ids
                .iter()
                .filter(|id| !rejected.contains(id))
                .map(ToString::to_string)
                .collect();
            WsMessage::response(
                msg.id,
                serde_json::json!({
                    "subscribed": subscribed,
                    "invalid": invalid,
                    "over_limit": rejected.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "count": subs.len(),
                    "wildcard": subs.is_wildcard(),
                }),
            )
        }
        WsCommand::Unsubscribe { event_ids } => {
            let (ids, wildcard, invalid) = parse_event_ids(&event_ids);
            subs.unfollow(&ids, wildcard);
            WsMessage::response(
                msg.id,
                serde_json::json!({
                    "unsubscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "invalid": invalid,
                    "remaining_count": subs.len(),
                    "wildcard": subs.is_wildcard(),
                }),
            )
        }
        WsCommand::GetAvailability { event_id } => {
            let Ok(uuid) = event_id.parse::<uuid::Uuid>() else {
                return WsMessage::error(msg.id, 400, "event_id must be a UUID");
            };
            match ticket_service.get_event(EventId::from_uuid(uuid)).await {
                Ok(event) => WsMessage::response(
                    msg.id,
                    serde_json::json!({
                        "event_id": event.id,
                        "version": event.version,
                        "tickets": event.tiers.iter().map(TierDto::from).collect::<Vec<_>>(),
                        "tickets_sold": event.tickets_sold(),
                        "capacity": event.capacity(),
                    }),
                ),
                Err(e) => WsMessage::error(msg.id, e.error_code(), &e.to_string()),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{AccountDirectory, EventBus, EventRegistry, PurchaseLedger};
    use crate::ws::messages::WsMessageType;

    fn service() -> TicketService {
        TicketService::new(
            Arc::new(EventRegistry::new()),
            Arc::new(PurchaseLedger::new()),
            Arc::new(AccountDirectory::new()),
            EventBus::new(16),
        )
    }

    fn command(payload: serde_json::Value) -> String {
        serde_json::json!({
            "id": "req-1",
            "type": "command",
            "timestamp": chrono::Utc::now(),
            "payload": payload,
        })
        .to_string()
    }

    #[tokio::test]
    async fn subscribe_wildcard() {
        let mut subs = EventSubscriptions::new();
        let reply = handle_text_message(
            &command(serde_json::json!({"command": "subscribe", "event_ids": ["*"]})),
            &mut subs,
            &service(),
        )
        .await;
        assert_eq!(reply.msg_type, WsMessageType::Response);
        assert_eq!(reply.id, "req-1");
        assert!(subs.is_wildcard());
    }

    #[tokio::test]
    async fn malformed_and_unknown_commands() {
        let mut subs = EventSubscriptions::new();
        let svc = service();

        let reply = handle_text_message("{not json", &mut subs, &svc).await;
        assert_eq!(reply.msg_type, WsMessageType::Error);

        let reply = handle_text_message(
            &command(serde_json::json!({"command": "teleport"})),
            &mut subs,
            &svc,
        )
        .await;
        assert_eq!(reply.msg_type, WsMessageType::Error);
        assert_eq!(reply.payload.get("code"), Some(&serde_json::json!(404)));
    }

    #[tokio::test]
    async fn availability_of_unknown_event_is_an_error() {
        let mut subs = EventSubscriptions::new();
        let reply = handle_text_message(
            &command(serde_json::json!({
                "command": "get_availability",
                "event_id": uuid::Uuid::new_v4().to_string(),
            })),
            &mut subs,
            &service(),
        )
        .await;
        assert_eq!(reply.msg_type, WsMessageType::Error);
        assert_eq!(reply.payload.get("code"), Some(&serde_json::json!(2001)));
    }
}
