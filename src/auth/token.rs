//! Signed bearer tokens (HS256 JWT).

use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{Account, AccountId, Role};
use crate::error::TicketingError;

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account the token was issued to.
    pub sub: uuid::Uuid,
    /// Account email at issue time.
    pub email: String,
    /// Account role at issue time.
    pub role: Role,
    /// Unique token ID, used for revocation.
    pub jti: uuid::Uuid,
    /// Issued-at, seconds since the epoch.
    pub iat: u64,
    /// Expiry, seconds since the epoch.
    pub exp: u64,
}

impl Claims {
    /// The token's subject as an [`AccountId`].
    #[must_use]
    pub const fn account_id(&self) -> AccountId {
        AccountId::from_uuid(self.sub)
    }

    /// Expiry as a timestamp.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.exp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// A freshly signed token and the claims inside it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWT string for the `Authorization: Bearer` header.
    pub token: String,
    /// Claims encoded in `token`.
    pub claims: Claims,
}

/// Signs and verifies tokens with a shared HMAC secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"<redacted>")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl TokenIssuer {
    /// Creates an issuer whose tokens live `ttl_secs` seconds.
    #[must_use]
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_secs,
        }
    }

    /// Token lifetime in seconds.
    #[must_use]
    pub const fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Issues a token for `account`.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Internal`] if signing fails.
    pub fn issue(&self, account: &Account) -> Result<IssuedToken, TicketingError> {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        let claims = Claims {
            sub: *account.id.as_uuid(),
            email: account.email.clone(),
            role: account.role,
            jti: uuid::Uuid::new_v4(),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };
        let token = self.sign(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, TicketingError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TicketingError::Internal(format!("token signing failed: {e}")))
    }

    /// Verifies the signature and expiry of `token`.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Unauthorized`] for any invalid token.
    pub fn verify(&self, token: &str) -> Result<Claims, TicketingError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                TicketingError::Unauthorized("invalid or expired token".to_string())
            })
    }
}
