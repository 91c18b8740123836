//! Registration, login and profile DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::coerce;
use crate::auth::IssuedToken;
use crate::domain::{Account, AccountId, Role, TicketHolding};
use crate::error::TicketingError;
use crate::service::Registration;

/// Request body for `POST /api/auth/register`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterOrganizerRequest {
    /// Organizer name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Password, at least 8 characters.
    pub password: String,
}

impl From<RegisterOrganizerRequest> for Registration {
    fn from(req: RegisterOrganizerRequest) -> Self {
        Self::organizer(req.name, req.email, req.password)
    }
}

/// Request body for `POST /api/user/register`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Password, at least 8 characters.
    pub password: String,
    /// Age, as a number or numeric string.
    #[serde(default)]
    #[schema(value_type = Option<u32>)]
    pub age: Option<Value>,
    /// Gender.
    #[serde(default)]
    pub gender: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

impl RegisterUserRequest {
    /// Converts into an attendee [`Registration`].
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InvalidRequest`] for a non-numeric age.
    pub fn into_registration(self) -> Result<Registration, TicketingError> {
        Ok(Registration {
            role: Role::Attendee,
            age: coerce::optional_count("age", self.age.as_ref())?,
            name: self.name,
            email: self.email,
            password: self.password,
            gender: self.gender,
            city: self.city,
            phone: self.phone,
        })
    }
}

/// Request body for both login endpoints.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Public view of an account. Never includes the password hash.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountDto {
    /// Account identifier.
    pub id: AccountId,
    /// Organizer or attendee.
    pub role: Role,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Age.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// Gender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// City.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountDto {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            role: account.role,
            name: account.name.clone(),
            email: account.email.clone(),
            age: account.age,
            gender: account.gender.clone(),
            city: account.city.clone(),
            phone: account.phone.clone(),
            created_at: account.created_at,
        }
    }
}

/// Response body for organizer registration and login.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// The account.
    pub user: AccountDto,
    /// Bearer token.
    pub token: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

impl AuthResponse {
    /// Pairs an account with its freshly issued token.
    #[must_use]
    pub fn new(account: &Account, issued: IssuedToken) -> Self {
        Self {
            user: AccountDto::from(account),
            expires_at: issued.claims.expires_at(),
            token: issued.token,
        }
    }
}

/// Response body for `POST /api/user/register`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterUserResponse {
    /// Confirmation text.
    pub message: String,
    /// New account ID.
    pub user_id: AccountId,
}

/// Response body for `POST /api/user/login`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Confirmation text.
    pub message: String,
    /// Bearer token.
    pub token: String,
    /// Account ID.
    pub user_id: AccountId,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

/// Response body for `GET /api/user/profile`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    /// The account.
    pub user: AccountDto,
    /// Tickets currently held.
    pub tickets: Vec<TicketHolding>,
}

impl From<&Account> for ProfileResponse {
    fn from(account: &Account) -> Self {
        Self {
            user: AccountDto::from(account),
            tickets: account.tickets.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::NewAccount;

    #[test]
    fn age_accepts_text() {
        let Ok(req) = serde_json::from_str::<RegisterUserRequest>(
            r#"{"name":"Kim","email":"kim@example.com","password":"password1","age":"31"}"#,
        ) else {
            panic!("body should deserialize");
        };
        let Ok(registration) = req.into_registration() else {
            panic!("valid registration");
        };
        assert_eq!(registration.age, Some(31));
        assert_eq!(registration.role, Role::Attendee);
    }

    #[test]
    fn account_dto_hides_password_hash() {
        let Ok(account) = Account::create(NewAccount {
            role: Role::Attendee,
            name: "Kim".to_string(),
            email: "kim@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            age: None,
            gender: None,
            city: None,
            phone: None,
        }) else {
            panic!("valid account");
        };
        let json = serde_json::to_string(&AccountDto::from(&account)).unwrap_or_default();
        assert!(json.contains("kim@example.com"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("\"age\""));
    }
}
