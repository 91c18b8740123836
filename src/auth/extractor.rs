//! `Authorization: Bearer` extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::token::Claims;
use crate::app_state::AppState;
use crate::domain::{AccountId, Role};
use crate::error::TicketingError;

/// The authenticated caller of a request.
///
/// Adding this as a handler argument makes the route require a valid,
/// unrevoked bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Verified token claims.
    pub claims: Claims,
}

impl AuthUser {
    /// The caller's account ID.
    #[must_use]
    pub const fn account_id(&self) -> AccountId {
        self.claims.account_id()
    }

    /// The caller's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.claims.role
    }

    /// Rejects callers that are not organizers.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Forbidden`] for attendee tokens.
    pub fn require_organizer(&self) -> Result<(), TicketingError> {
        match self.role() {
            Role::Organizer => Ok(()),
            Role::Attendee => Err(TicketingError::Forbidden(
                "this action requires an organizer account".to_string(),
            )),
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = TicketingError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = state.account_service.authenticate(token).await?;
        Ok(Self { claims })
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
///
/// # Errors
///
/// Returns [`TicketingError::Unauthorized`] when the header is missing,
/// not UTF-8, or not a bearer credential.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, TicketingError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| TicketingError::Unauthorized("missing bearer token".to_string()))?
        .to_str()
        .map_err(|_| TicketingError::Unauthorized("malformed authorization header".to_string()))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| TicketingError::Unauthorized("malformed authorization header".to_string()))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(TicketingError::Unauthorized(
            "expected a bearer token".to_string(),
        ));
    }
    Ok(token)
}
