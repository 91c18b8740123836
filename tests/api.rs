//! End-to-end tests that run the real router on an ephemeral port and
//! drive it over HTTP and WebSocket.

#![allow(clippy::panic)]

use std::time::Duration;

use chillr_tickets::api::build_app;
use chillr_tickets::app_state::AppState;
use chillr_tickets::config::TicketingConfig;
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

struct TestServer {
    base: String,
    ws: String,
    client: Client,
}

impl TestServer {
    async fn start() -> Self {
        let config = TicketingConfig::default();
        let state = AppState::from_config(&config);
        let app = build_app(state, &config);
        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind ephemeral port");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("local addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            base: format!("http://{addr}/api"),
            ws: format!("ws://{addr}/ws"),
            client: Client::new(),
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> (StatusCode, Value) {
        let Ok(resp) = req.send().await else {
            panic!("request failed");
        };
        let status = resp.status();
        let body = resp.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut req = self.client.post(format!("{}{path}", self.base)).json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        self.send(req).await
    }

    async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut req = self.client.get(format!("{}{path}", self.base));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        self.send(req).await
    }

    async fn organizer(&self, email: &str) -> String {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                json!({ "name": "Ada Events", "email": email, "password": "organizer-pass" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let Some(token) = body["token"].as_str() else {
            panic!("register should return a token: {body}");
        };
        token.to_string()
    }

    async fn attendee(&self, email: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/user/register",
                None,
                json!({ "name": "Sam", "email": email, "password": "attendee-pass", "age": "27" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");

        let (status, body) = self
            .post(
                "/user/login",
                None,
                json!({ "email": email, "password": "attendee-pass" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let (Some(token), Some(user_id)) = (body["token"].as_str(), body["user_id"].as_str())
        else {
            panic!("login should return token and user_id: {body}");
        };
        (token.to_string(), user_id.to_string())
    }

    async fn create_event(&self, token: &str, vip: u32) -> String {
        let (status, body) = self
            .post(
                "/events",
                Some(token),
                json!({
                    "eventName": "Rooftop Sessions",
                    "venue": "Pier 9",
                    "date": "2030-06-01T20:00",
                    "description": "Live set",
                    "target": "150",
                    "vipTickets": vip,
                    "vipTicketPrice": "50",
                    "generalTickets": "100",
                    "generalTicketPrice": 20,
                    "earlyBirdTickets": "",
                    "earlyBirdTicketPrice": null
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["message"], "Event created successfully");
        let Some(id) = body["event"]["id"].as_str() else {
            panic!("created event should carry an id: {body}");
        };
        id.to_string()
    }
}

#[tokio::test]
async fn health_and_root_respond() {
    let server = TestServer::start().await;
    let root = server.base.trim_end_matches("/api").to_string();

    let Ok(resp) = server.client.get(format!("{root}/")).send().await else {
        panic!("root request failed");
    };
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap_or_default(), "API is running...");

    let Ok(resp) = server.client.get(format!("{root}/health")).send().await else {
        panic!("health request failed");
    };
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get("x-content-type-options")
            .and_then(|v| v.to_str().ok()),
        Some("nosniff")
    );
    let health: Value = resp.json().await.unwrap_or(Value::Null);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["events"], 0);
}

#[tokio::test]
async fn organizer_flow_creates_and_lists_events() {
    let server = TestServer::start().await;
    let token = server.organizer("ada@example.com").await;

    let (status, body) = server
        .post(
            "/auth/login",
            None,
            json!({ "email": "ada@example.com", "password": "organizer-pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["user"].get("password_hash").is_none());

    let event_id = server.create_event(&token, 10).await;

    let (status, body) = server.get("/events/my-events", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let Some(events) = body.as_array() else {
        panic!("my-events should be a list: {body}");
    };
    assert_eq!(events.len(), 1);

    for path in ["/events/public", "/events"] {
        let (status, body) = server.get(path, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["data"][0]["id"], event_id.as_str());
        assert_eq!(body["data"][0]["organizer"]["email"], "ada@example.com");
    }

    let (status, body) = server.get(&format!("/events/{event_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Rooftop Sessions");

    let (status, body) = server
        .get(&format!("/events/{}", uuid::Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 2001);
}

#[tokio::test]
async fn create_event_rejects_bad_input_and_attendees() {
    let server = TestServer::start().await;
    let organizer = server.organizer("org@example.com").await;
    let (attendee, _) = server.attendee("fan@example.com").await;

    let (status, body) = server
        .post("/events", Some(&organizer), json!({ "venue": "Nowhere" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("Missing required fields"))
    );

    let (status, _) = server
        .post(
            "/events",
            Some(&attendee),
            json!({ "eventName": "X", "venue": "Y", "date": "2030-01-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server
        .post(
            "/events",
            None,
            json!({ "eventName": "X", "venue": "Y", "date": "2030-01-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_and_login_errors() {
    let server = TestServer::start().await;
    server.attendee("dup@example.com").await;

    let (status, body) = server
        .post(
            "/user/register",
            None,
            json!({ "name": "Dup", "email": "dup@example.com", "password": "another-pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], 4002);

    let (status, _) = server
        .post(
            "/user/login",
            None,
            json!({ "email": "dup@example.com", "password": "wrong-pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Attendees cannot use the organizer login.
    let (status, _) = server
        .post(
            "/auth/login",
            None,
            json!({ "email": "dup@example.com", "password": "attendee-pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn purchase_replay_refund_and_dashboard() {
    let server = TestServer::start().await;
    let organizer = server.organizer("host@example.com").await;
    let event_id = server.create_event(&organizer, 3).await;
    let (attendee, user_id) = server.attendee("buyer@example.com").await;

    let buy = json!({ "eventId": event_id, "type": "VIP", "quantity": "2", "userId": user_id });
    let send_buy = || {
        server
            .client
            .post(format!("{}/purchase/buy", server.base))
            .bearer_auth(&attendee)
            .header("Idempotency-Key", "order-1")
            .json(&buy)
    };

    let (status, first) = server.send(send_buy()).await;
    assert_eq!(status, StatusCode::CREATED, "{first}");
    assert_eq!(first["replayed"], false);
    assert_eq!(first["purchase"]["quantity"], 2);

    let (status, again) = server.send(send_buy()).await;
    assert_eq!(status, StatusCode::OK, "{again}");
    assert_eq!(again["replayed"], true);
    assert_eq!(again["purchase"]["id"], first["purchase"]["id"]);

    let (status, body) = server
        .post(
            "/purchase/buy",
            Some(&attendee),
            json!({ "eventId": event_id, "type": "vip", "quantity": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], 4001);

    let (status, _) = server
        .post(
            "/purchase/buy",
            Some(&attendee),
            json!({ "eventId": event_id, "type": "vip", "userId": uuid::Uuid::new_v4() }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server.get("/user/profile", Some(&attendee)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["age"], 27);
    assert_eq!(body["tickets"][0]["quantity"], 2);

    let (status, body) = server
        .get(&format!("/events/{event_id}/dashboard"), Some(&organizer))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["completed_purchases"], 1);

    let (status, _) = server
        .get(&format!("/events/{event_id}/dashboard"), Some(&attendee))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let Some(purchase_id) = first["purchase"]["id"].as_str() else {
        panic!("purchase id missing: {first}");
    };
    let refund_path = format!("/purchase/{purchase_id}/refund");
    let (status, body) = server.post(&refund_path, Some(&attendee), json!({})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "refunded");

    let (status, _) = server.post(&refund_path, Some(&organizer), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = server.get("/user/purchases", Some(&attendee)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (_, body) = server.get(&format!("/events/{event_id}"), None).await;
    let vip = body["tickets"]
        .as_array()
        .and_then(|tiers| tiers.iter().find(|t| t["type"] == "vip"));
    let Some(vip) = vip else {
        panic!("vip tier missing: {body}");
    };
    assert_eq!(vip["available"], 3);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let server = TestServer::start().await;
    let (token, _) = server.attendee("leaver@example.com").await;

    let (status, body) = server.post("/user/logout", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User logged out successfully");

    let (status, body) = server.get("/user/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], 5001);
}

#[tokio::test]
async fn websocket_subscriber_sees_purchases() {
    let server = TestServer::start().await;
    let organizer = server.organizer("live@example.com").await;
    let event_id = server.create_event(&organizer, 5).await;
    let (attendee, _) = server.attendee("watcher@example.com").await;

    let Ok((mut socket, _)) = tokio_tungstenite::connect_async(server.ws.as_str()).await else {
        panic!("ws connect failed");
    };
    let subscribe = json!({
        "id": "sub-1",
        "type": "command",
        "timestamp": chrono::Utc::now(),
        "payload": { "command": "subscribe", "event_ids": [event_id] }
    });
    let Ok(()) = socket.send(Message::text(subscribe.to_string())).await else {
        panic!("ws send failed");
    };

    let reply = next_json(&mut socket).await;
    assert_eq!(reply["id"], "sub-1");
    assert_eq!(reply["type"], "response");
    assert_eq!(reply["payload"]["count"], 1);

    let (status, _) = server
        .post(
            "/purchase/buy",
            Some(&attendee),
            json!({ "event_id": event_id, "tier": "general", "quantity": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let pushed = next_json(&mut socket).await;
    assert_eq!(pushed["type"], "event");
    assert_eq!(pushed["payload"]["event_type"], "tickets_purchased");
    assert_eq!(pushed["payload"]["event_id"], event_id.as_str());
    assert_eq!(pushed["payload"]["remaining"], 99);
}

async fn next_json<S>(socket: &mut S) -> Value
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let next = tokio::time::timeout(Duration::from_secs(5), socket.next()).await;
        let Ok(Some(Ok(msg))) = next else {
            panic!("no ws message within timeout");
        };
        if let Message::Text(text) = msg {
            let Ok(value) = serde_json::from_str(text.as_str()) else {
                panic!("ws frame is not JSON: {text}");
            };
            return value;
        }
    }
}
