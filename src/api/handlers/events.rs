//! Event handlers: create, list, detail and organizer dashboard.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreateEventRequest, CreateEventResponse, DashboardResponse, EventDetailDto, EventListItemDto,
    PaginationParams, PublicEventDto, PublicEventListResponse,
};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::EventId;
use crate::error::{ErrorResponse, TicketingError};

/// `POST /events`: Create an event.
///
/// # Errors
///
/// Returns [`TicketingError`] for non-organizers or invalid form data.
#[utoipa::path(
    post,
    path = "/api/events",
    tag = "Events",
    summary = "Create an event",
    description = "Creates an event with VIP, general and early-bird tiers. Counts, prices and target accept numbers or numeric strings.",
    request_body = CreateEventRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Event created", body = CreateEventResponse),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not an organizer", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, TicketingError> {
    user.require_organizer()?;
    let event = state
        .ticket_service
        .create_event(user.account_id(), req.into_new_event()?)
        .await?;
    Ok((StatusCode::CREATED, Json(CreateEventResponse::from(&event))))
}

/// `GET /events/my-events`: The organizer's own events.
///
/// # Errors
///
/// Returns [`TicketingError`] for missing tokens or non-organizers.
#[utoipa::path(
    get,
    path = "/api/events/my-events",
    tag = "Events",
    summary = "List my events",
    description = "Returns the caller's events with tier inventory, ordered by date.",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Organizer's events", body = Vec<EventListItemDto>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not an organizer", body = ErrorResponse),
    )
)]
pub async fn my_events(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, TicketingError> {
    user.require_organizer()?;
    let events = state.ticket_service.my_events(user.account_id()).await;
    let data: Vec<EventListItemDto> = events.iter().map(EventListItemDto::from).collect();
    Ok(Json(data))
}

/// `GET /events/public`: Public event catalogue.
#[utoipa::path(
    get,
    path = "/api/events/public",
    tag = "Events",
    summary = "List public events",
    description = "Returns a paginated list of all events with their organizer's name and email, ordered by date. Also served at `GET /api/events`.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated event list", body = PublicEventListResponse),
    )
)]
pub async fn public_events(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let events = state.ticket_service.public_events().await;
    let (page, pagination) = params.paginate(events);
    Json(PublicEventListResponse {
        data: page.into_iter().map(PublicEventDto::from).collect(),
        pagination,
    })
}

/// `GET /events/{id}`: Event detail.
///
/// # Errors
///
/// Returns [`TicketingError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/events/{id}",
    tag = "Events",
    summary = "Get event details",
    description = "Returns one event with current tier inventory and version.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event details", body = EventDetailDto),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TicketingError> {
    let event = state
        .ticket_service
        .get_event(EventId::from_uuid(id))
        .await?;
    Ok(Json(EventDetailDto::from(&event)))
}

/// `GET /events/{id}/dashboard`: Sales overview for the owner.
///
/// # Errors
///
/// Returns [`TicketingError`] if the event does not exist or the caller
/// does not own it.
#[utoipa::path(
    get,
    path = "/api/events/{id}/dashboard",
    tag = "Events",
    summary = "Event sales dashboard",
    description = "Tickets sold per tier, gross revenue and break-even progress. Only the owning organizer may view it.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not the event's organizer", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TicketingError> {
    let dashboard = state
        .ticket_service
        .dashboard(user.account_id(), EventId::from_uuid(id))
        .await?;
    Ok(Json(DashboardResponse::from(&dashboard)))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event).get(public_events))
        .route("/events/public", get(public_events))
        .route("/events/my-events", get(my_events))
        .route("/events/{id}", get(get_event))
        .route("/events/{id}/dashboard", get(dashboard))
}
