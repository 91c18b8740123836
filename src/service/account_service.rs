//! Account service: registration, login, logout and token checks.

use std::sync::Arc;

use crate::auth::password::{
    hash_password_blocking, validate_password, verify_password_blocking, verify_placeholder,
};
use crate::auth::{Claims, IssuedToken, TokenDenylist, TokenIssuer};
use crate::domain::{Account, AccountDirectory, AccountId, NewAccount, Role};
use crate::error::TicketingError;

/// Input for [`AccountService::register`].
#[derive(Debug, Clone)]
pub struct Registration {
    /// Organizer or attendee.
    pub role: Role,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plaintext password. Hashed before storage.
    pub password: String,
    /// Attendee age.
    pub age: Option<u32>,
    /// Attendee gender.
    pub gender: Option<String>,
    /// Attendee city.
    pub city: Option<String>,
    /// Attendee phone number.
    pub phone: Option<String>,
}

impl Registration {
    /// Registration with only the fields organizers provide.
    #[must_use]
    pub fn organizer(name: String, email: String, password: String) -> Self {
        Self {
            role: Role::Organizer,
            name,
            email,
            password,
            age: None,
            gender: None,
            city: None,
            phone: None,
        }
    }
}

/// Owns the account directory and everything token related.
#[derive(Debug)]
pub struct AccountService {
    directory: Arc<AccountDirectory>,
    tokens: TokenIssuer,
    denylist: TokenDenylist,
}

impl AccountService {
    /// Creates a new `AccountService`.
    #[must_use]
    pub fn new(directory: Arc<AccountDirectory>, tokens: TokenIssuer) -> Self {
        Self {
            directory,
            tokens,
            denylist: TokenDenylist::new(),
        }
    }

    /// Returns a reference to the inner [`AccountDirectory`].
    #[must_use]
    pub fn directory(&self) -> &Arc<AccountDirectory> {
        &self.directory
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InvalidRequest`] for a weak password or bad
    /// profile fields, and [`TicketingError::EmailTaken`] when the email is
    /// already registered.
    pub async fn register(&self, input: Registration) -> Result<Account, TicketingError> {
        validate_password(&input.password)?;
        let password_hash = hash_password_blocking(input.password).await?;
        let account = Account::create(NewAccount {
            role: input.role,
            name: input.name,
            email: input.email,
            password_hash,
            age: input.age,
            gender: input.gender,
            city: input.city,
            phone: input.phone,
        })?;
        self.directory.insert(account.clone()).await?;
        tracing::info!(account_id = %account.id, role = %account.role, "account registered");
        Ok(account)
    }

    /// Checks credentials and issues a bearer token.
    ///
    /// With `required_role` set, an account of another role is rejected
    /// the same way as a wrong password.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InvalidCredentials`] for an unknown email,
    /// a wrong password or a role mismatch.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        required_role: Option<Role>,
    ) -> Result<(Account, IssuedToken), TicketingError> {
        let Some(account) = self.directory.find_by_email(email).await else {
            tracing::debug!("login for unknown email");
            verify_placeholder(password.to_string()).await;
            return Err(TicketingError::InvalidCredentials);
        };
        let verified =
            verify_password_blocking(password.to_string(), account.password_hash.clone()).await?;
        if !verified {
            tracing::debug!(account_id = %account.id, "login with wrong password");
            return Err(TicketingError::InvalidCredentials);
        }
        if required_role.is_some_and(|role| role != account.role) {
            tracing::debug!(account_id = %account.id, "login with wrong role");
            return Err(TicketingError::InvalidCredentials);
        }
        let issued = self.issue(&account)?;
        tracing::info!(account_id = %account.id, "login succeeded");
        Ok((account, issued))
    }

    /// Issues a fresh token for `account`.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Internal`] if signing fails.
    pub fn issue(&self, account: &Account) -> Result<IssuedToken, TicketingError> {
        self.tokens.issue(account)
    }

    /// Revokes the token described by `claims` until it expires.
    pub async fn logout(&self, claims: &Claims) {
        self.denylist.revoke(claims.jti, claims.exp).await;
        tracing::info!(account_id = %claims.account_id(), "logged out");
    }

    /// Verifies a bearer token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Unauthorized`] if the token is invalid,
    /// expired, revoked, or its account no longer exists.
    pub async fn authenticate(&self, token: &str) -> Result<Claims, TicketingError> {
        let claims = self.tokens.verify(token)?;
        if self.denylist.is_revoked(claims.jti).await {
            return Err(TicketingError::Unauthorized("token has been revoked".to_string()));
        }
        if self.directory.get(claims.account_id()).await.is_err() {
            return Err(TicketingError::Unauthorized("account no longer exists".to_string()));
        }
        Ok(claims)
    }

    /// Returns the account with its ticket holdings.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::AccountNotFound`] for an unknown ID.
    pub async fn profile(&self, id: AccountId) -> Result<Account, TicketingError> {
        self.directory.get(id).await
    }
}
