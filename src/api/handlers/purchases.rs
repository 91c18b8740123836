//! Purchase handlers: buy, refund and purchase history.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{BuyTicketsRequest, BuyTicketsResponse, PurchaseDto, PurchaseListResponse};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::PurchaseId;
use crate::error::{ErrorResponse, TicketingError};

/// Header carrying the client's retry key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// `POST /purchase/buy`: Buy tickets.
///
/// # Errors
///
/// Returns [`TicketingError`] for bad input, unknown events, sold-out
/// tiers or idempotency conflicts.
#[utoipa::path(
    post,
    path = "/api/purchase/buy",
    tag = "Purchases",
    summary = "Buy tickets",
    description = "Buys tickets of one tier for the caller. Retrying with the same `Idempotency-Key` header (or `idempotency_key` field) returns the original purchase.",
    request_body = BuyTicketsRequest,
    params(
        ("Idempotency-Key" = Option<String>, Header, description = "Client-chosen retry key"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Tickets purchased", body = BuyTicketsResponse),
        (status = 200, description = "Replay of an earlier purchase", body = BuyTicketsResponse),
        (status = 400, description = "Invalid tier or quantity", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "userId does not match the token", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Tickets not available or key conflict", body = ErrorResponse),
    )
)]
pub async fn buy(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    Json(req): Json<BuyTicketsRequest>,
) -> Result<impl IntoResponse, TicketingError> {
    if req
        .user_id
        .is_some_and(|id| id != *user.account_id().as_uuid())
    {
        return Err(TicketingError::Forbidden(
            "cannot purchase on behalf of another user".to_string(),
        ));
    }
    let header_key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .map(|v| {
            v.to_str()
                .map(str::to_string)
                .map_err(|_| TicketingError::InvalidRequest("Idempotency-Key must be ASCII".to_string()))
        })
        .transpose()?;

    let outcome = state
        .ticket_service
        .purchase(user.account_id(), req.into_purchase(header_key)?)
        .await?;
    let status = if outcome.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(BuyTicketsResponse::from(&outcome))))
}

/// `POST /purchase/{id}/refund`: Refund a purchase.
///
/// # Errors
///
/// Returns [`TicketingError`] if the purchase does not exist, the caller
/// may not refund it, or it was already refunded.
#[utoipa::path(
    post,
    path = "/api/purchase/{id}/refund",
    tag = "Purchases",
    summary = "Refund a purchase",
    description = "Returns the tickets to inventory. Allowed for the buyer and the event's organizer.",
    params(
        ("id" = uuid::Uuid, Path, description = "Purchase UUID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Purchase refunded", body = PurchaseDto),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not the buyer or organizer", body = ErrorResponse),
        (status = 404, description = "Purchase not found", body = ErrorResponse),
        (status = 409, description = "Already refunded", body = ErrorResponse),
    )
)]
pub async fn refund(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TicketingError> {
    let purchase = state
        .ticket_service
        .refund(user.account_id(), PurchaseId::from_uuid(id))
        .await?;
    Ok(Json(PurchaseDto::from(&purchase)))
}

/// `GET /user/purchases`: The caller's purchase history.
#[utoipa::path(
    get,
    path = "/api/user/purchases",
    tag = "Purchases",
    summary = "List my purchases",
    description = "Returns every purchase made by the caller, oldest first, including refunded ones.",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Purchase history", body = PurchaseListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn my_purchases(State(state): State<AppState>, user: AuthUser) -> impl IntoResponse {
    let purchases = state.ticket_service.purchases_for(user.account_id()).await;
    Json(PurchaseListResponse {
        data: purchases.iter().map(PurchaseDto::from).collect(),
    })
}

/// Purchase routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/purchase/buy", post(buy))
        .route("/purchase/{id}/refund", post(refund))
        .route("/user/purchases", get(my_purchases))
}
