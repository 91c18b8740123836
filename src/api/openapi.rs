//! OpenAPI document for the REST API.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::dto;
use super::handlers::{accounts, events, purchases, system};
use crate::domain::{PurchaseStatus, Role, TicketHolding, TierKind};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI document, served by Swagger UI.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Chillr Tickets API",
        description = "Organizers publish events with VIP, general and early-bird tiers; attendees buy and refund tickets."
    ),
    paths(
        system::health_handler,
        system::root_handler,
        accounts::register_organizer,
        accounts::login_organizer,
        accounts::register_user,
        accounts::login_user,
        accounts::logout,
        accounts::profile,
        events::create_event,
        events::my_events,
        events::public_events,
        events::get_event,
        events::dashboard,
        purchases::buy,
        purchases::refund,
        purchases::my_purchases,
    ),
    components(schemas(
        ErrorResponse,
        ErrorBody,
        Role,
        TierKind,
        PurchaseStatus,
        TicketHolding,
        system::HealthResponse,
        dto::MessageResponse,
        dto::PaginationMeta,
        dto::RegisterOrganizerRequest,
        dto::RegisterUserRequest,
        dto::LoginRequest,
        dto::AccountDto,
        dto::AuthResponse,
        dto::RegisterUserResponse,
        dto::LoginResponse,
        dto::ProfileResponse,
        dto::CreateEventRequest,
        dto::CreateEventResponse,
        dto::CreatedEventDto,
        dto::TierDto,
        dto::EventListItemDto,
        dto::OrganizerDto,
        dto::PublicEventDto,
        dto::PublicEventListResponse,
        dto::EventDetailDto,
        dto::TierSalesDto,
        dto::DashboardResponse,
        dto::BuyTicketsRequest,
        dto::PurchaseDto,
        dto::BuyTicketsResponse,
        dto::PurchaseListResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "System", description = "Health and liveness"),
        (name = "Auth", description = "Organizer accounts"),
        (name = "Users", description = "Attendee accounts"),
        (name = "Events", description = "Event catalogue and dashboards"),
        (name = "Purchases", description = "Ticket purchases and refunds"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected routes.
#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
