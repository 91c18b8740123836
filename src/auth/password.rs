//! Argon2id password hashing.
//!
//! Hashing is deliberately slow, so the async wrappers move the work onto
//! tokio's blocking pool.

use std::sync::OnceLock;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::error::TicketingError;

/// Hash checked when no account matches a login, so that path costs the
/// same argon2 work as a wrong password.
static PLACEHOLDER_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum accepted password length, in characters.
pub const MAX_PASSWORD_LEN: usize = 128;

/// Checks password length bounds.
///
/// # Errors
///
/// Returns [`TicketingError::InvalidRequest`] when the password is too
/// short or too long.
pub fn validate_password(password: &str) -> Result<(), TicketingError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(TicketingError::InvalidRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(TicketingError::InvalidRequest(format!(
            "password must be at most {MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Hashes `password` into an Argon2id PHC string with a random salt.
///
/// # Errors
///
/// Returns [`TicketingError::Internal`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, TicketingError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| TicketingError::Internal(format!("password hashing failed: {e}")))
}

/// Checks `password` against a stored PHC hash.
///
/// # Errors
///
/// Returns [`TicketingError::Internal`] if the stored hash is malformed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, TicketingError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| TicketingError::Internal(format!("stored password hash is invalid: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// [`hash_password`] on the blocking pool.
///
/// # Errors
///
/// Returns [`TicketingError::Internal`] if hashing fails or the blocking
/// task panics.
pub async fn hash_password_blocking(password: String) -> Result<String, TicketingError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| TicketingError::Internal(format!("hashing task failed: {e}")))?
}

/// [`verify_password`] on the blocking pool.
///
/// # Errors
///
/// Returns [`TicketingError::Internal`] if the hash is malformed or the
/// blocking task panics.
pub async fn verify_password_blocking(
    password: String,
    stored_hash: String,
) -> Result<bool, TicketingError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| TicketingError::Internal(format!("verification task failed: {e}")))?
}

fn placeholder_hash() -> Option<&'static str> {
    PLACEHOLDER_HASH
        .get_or_init(|| hash_password("chillr-placeholder-credential").ok())
        .as_deref()
}

/// Verifies `password` against a fixed hash on the blocking pool and
/// discards the outcome.
pub async fn verify_placeholder(password: String) {
    let outcome = tokio::task::spawn_blocking(move || {
        placeholder_hash().is_some_and(|hash| verify_password(&password, hash).unwrap_or(false))
    })
    .await;
    if let Err(e) = outcome {
        tracing::warn!(error = %e, "placeholder verification task failed");
    }
}
