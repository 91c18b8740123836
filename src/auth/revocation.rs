//! Server-side logout: a deny-list of revoked token IDs.
//!
//! Entries only need to live until the token would have expired anyway,
//! so the list prunes itself on every revocation.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

/// Revoked token IDs mapped to their expiry (seconds since the epoch).
#[derive(Debug, Default)]
pub struct TokenDenylist {
    revoked: RwLock<HashMap<uuid::Uuid, u64>>,
}

impl TokenDenylist {
    /// Creates an empty deny-list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Revokes the token `jti` until `exp`.
    pub async fn revoke(&self, jti: uuid::Uuid, exp: u64) {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, expiry| *expiry > now);
        revoked.insert(jti, exp);
    }

    /// `true` if `jti` was revoked.
    pub async fn is_revoked(&self, jti: uuid::Uuid) -> bool {
        self.revoked.read().await.contains_key(&jti)
    }

    /// Number of entries currently held.
    pub async fn len(&self) -> usize {
        self.revoked.read().await.len()
    }

    /// `true` if nothing is revoked.
    pub async fn is_empty(&self) -> bool {
        self.revoked.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> u64 {
        u64::try_from(Utc::now().timestamp()).unwrap_or(0)
    }

    #[tokio::test]
    async fn revoked_token_is_reported() {
        let list = TokenDenylist::new();
        let jti = uuid::Uuid::new_v4();
        assert!(!list.is_revoked(jti).await);
        list.revoke(jti, now() + 60).await;
        assert!(list.is_revoked(jti).await);
    }

    #[tokio::test]
    async fn expired_entries_are_pruned() {
        let list = TokenDenylist::new();
        list.revoke(uuid::Uuid::new_v4(), now().saturating_sub(10)).await;
        list.revoke(uuid::Uuid::new_v4(), now() + 60).await;
        assert_eq!(list.len().await, 1);
    }
}
