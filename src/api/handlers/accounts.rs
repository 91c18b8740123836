//! Account handlers: organizer and attendee registration, login, logout
//! and profile.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    AuthResponse, LoginRequest, LoginResponse, MessageResponse, ProfileResponse,
    RegisterOrganizerRequest, RegisterUserRequest, RegisterUserResponse,
};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::Role;
use crate::error::{ErrorResponse, TicketingError};
use crate::service::Registration;

/// `POST /auth/register`: Register an organizer.
///
/// # Errors
///
/// Returns [`TicketingError`] on invalid input or a taken email.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    summary = "Register an organizer",
    description = "Creates an organizer account and returns it with a bearer token.",
    request_body = RegisterOrganizerRequest,
    responses(
        (status = 201, description = "Organizer registered", body = AuthResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    )
)]
pub async fn register_organizer(
    State(state): State<AppState>,
    Json(req): Json<RegisterOrganizerRequest>,
) -> Result<impl IntoResponse, TicketingError> {
    let account = state
        .account_service
        .register(Registration::from(req))
        .await?;
    let issued = state.account_service.issue(&account)?;
    Ok((StatusCode::CREATED, Json(AuthResponse::new(&account, issued))))
}

/// `POST /auth/login`: Organizer login.
///
/// # Errors
///
/// Returns [`TicketingError::InvalidCredentials`] for a wrong email,
/// password, or a non-organizer account.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    summary = "Organizer login",
    description = "Checks organizer credentials and returns a bearer token.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    )
)]
pub async fn login_organizer(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, TicketingError> {
    let (account, issued) = state
        .account_service
        .login(&req.email, &req.password, Some(Role::Organizer))
        .await?;
    Ok(Json(AuthResponse::new(&account, issued)))
}

/// `POST /user/register`: Register an attendee.
///
/// # Errors
///
/// Returns [`TicketingError`] on invalid input or a taken email.
#[utoipa::path(
    post,
    path = "/api/user/register",
    tag = "Users",
    summary = "Register an attendee",
    description = "Creates an attendee account with optional profile details.",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterUserResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, TicketingError> {
    let account = state
        .account_service
        .register(req.into_registration()?)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterUserResponse {
            message: "User registered successfully".to_string(),
            user_id: account.id,
        }),
    ))
}

/// `POST /user/login`: Attendee login.
///
/// # Errors
///
/// Returns [`TicketingError::InvalidCredentials`] for a wrong email or
/// password.
#[utoipa::path(
    post,
    path = "/api/user/login",
    tag = "Users",
    summary = "User login",
    description = "Checks credentials and returns a bearer token valid for `JWT_TTL_SECS`.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    )
)]
pub async fn login_user(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, TicketingError> {
    let (account, issued) = state
        .account_service
        .login(&req.email, &req.password, None)
        .await?;
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        expires_at: issued.claims.expires_at(),
        token: issued.token,
        user_id: account.id,
    }))
}

/// `POST /user/logout`: Revoke the caller's token.
#[utoipa::path(
    post,
    path = "/api/user/logout",
    tag = "Users",
    summary = "Logout",
    description = "Revokes the bearer token used for this request.",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> impl IntoResponse {
    state.account_service.logout(&user.claims).await;
    Json(MessageResponse::new("User logged out successfully"))
}

/// `GET /user/profile`: The caller's profile and tickets.
///
/// # Errors
///
/// Returns [`TicketingError::Unauthorized`] without a valid token.
#[utoipa::path(
    get,
    path = "/api/user/profile",
    tag = "Users",
    summary = "Get profile",
    description = "Returns the caller's account details and ticket holdings.",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, TicketingError> {
    let account = state.account_service.profile(user.account_id()).await?;
    Ok(Json(ProfileResponse::from(&account)))
}

/// Account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register_organizer))
        .route("/auth/login", post(login_organizer))
        .route("/user/register", post(register_user))
        .route("/user/login", post(login_user))
        .route("/user/logout", post(logout))
        .route("/user/profile", get(profile))
}
