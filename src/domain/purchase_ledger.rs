//! Purchase ledger with idempotency-key tracking.
//!
//! Every purchase lands here as a standalone record, so sales can be
//! audited, refunded and deduplicated. Idempotency keys are scoped to the
//! buying account.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::purchase::Purchase;
use super::{AccountId, EventId, PurchaseId};
use crate::error::TicketingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyState {
    Pending,
    Completed(PurchaseId),
}

/// Outcome of claiming an idempotency key with [`PurchaseLedger::begin`].
#[derive(Debug)]
pub enum Reservation {
    /// No earlier purchase with this key: go ahead.
    Fresh,
    /// The key already produced this purchase.
    Replay(Purchase),
}

#[derive(Debug, Default)]
struct Ledger {
    purchases: HashMap<PurchaseId, Purchase>,
    keys: HashMap<(AccountId, String), KeyState>,
}

/// Store of all purchases.
#[derive(Debug, Default)]
pub struct PurchaseLedger {
    inner: RwLock<Ledger>,
}

impl PurchaseLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `key` for `account` before a purchase starts.
    ///
    /// Without a key the purchase is always [`Reservation::Fresh`]. A key
    /// seen before replays the stored purchase. The caller must follow a
    /// `Fresh` claim with [`commit`](Self::commit) or [`abort`](Self::abort).
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::IdempotencyConflict`] while another request
    /// holding the same key is still in flight.
    pub async fn begin(
        &self,
        account: AccountId,
        key: Option<&str>,
    ) -> Result<Reservation, TicketingError> {
        let Some(key) = key else {
            return Ok(Reservation::Fresh);
        };
        let mut ledger = self.inner.write().await;
        let slot = (account, key.to_string());
        match ledger.keys.get(&slot).copied() {
            None => {
                ledger.keys.insert(slot, KeyState::Pending);
                Ok(Reservation::Fresh)
            }
            Some(KeyState::Pending) => Err(TicketingError::IdempotencyConflict(format!(
                "a purchase with key '{key}' is still in progress"
            ))),
            Some(KeyState::Completed(id)) => ledger
                .purchases
                .get(&id)
                .cloned()
                .map(Reservation::Replay)
                .ok_or_else(|| {
                    TicketingError::Internal(format!("idempotency key points at missing purchase {id}"))
                }),
        }
    }

    /// Records a completed purchase and settles its key.
    pub async fn commit(&self, purchase: Purchase) {
        let mut ledger = self.inner.write().await;
        if let Some(key) = purchase.idempotency_key.clone() {
            ledger
                .keys
                .insert((purchase.account_id, key), KeyState::Completed(purchase.id));
        }
        ledger.purchases.insert(purchase.id, purchase);
    }

    /// Releases a pending key after a failed purchase so the client can
    /// retry with it.
    pub async fn abort(&self, account: AccountId, key: Option<&str>) {
        let Some(key) = key else {
            return;
        };
        let mut ledger = self.inner.write().await;
        let slot = (account, key.to_string());
        if ledger.keys.get(&slot) == Some(&KeyState::Pending) {
            ledger.keys.remove(&slot);
        }
    }

    /// Returns a copy of the purchase.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::PurchaseNotFound`] for an unknown ID.
    pub async fn get(&self, id: PurchaseId) -> Result<Purchase, TicketingError> {
        self.inner
            .read()
            .await
            .purchases
            .get(&id)
            .cloned()
            .ok_or(TicketingError::PurchaseNotFound(*id.as_uuid()))
    }

    /// Applies `f` to the stored purchase and returns its result.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::PurchaseNotFound`] for an unknown ID, or
    /// whatever error `f` returns.
    pub async fn update<F, R>(&self, id: PurchaseId, f: F) -> Result<R, TicketingError>
    where
        F: FnOnce(&mut Purchase) -> Result<R, TicketingError>,
    {
        let mut ledger = self.inner.write().await;
        let purchase = ledger
            .purchases
            .get_mut(&id)
            .ok_or(TicketingError::PurchaseNotFound(*id.as_uuid()))?;
        f(purchase)
    }

    /// Purchases made by `account`, oldest first.
    pub async fn for_account(&self, account: AccountId) -> Vec<Purchase> {
        self.filtered(|p| p.account_id == account).await
    }

    /// Purchases for `event`, oldest first.
    pub async fn for_event(&self, event: EventId) -> Vec<Purchase> {
        self.filtered(|p| p.event_id == event).await
    }

    async fn filtered<F>(&self, keep: F) -> Vec<Purchase>
    where
        F: Fn(&Purchase) -> bool,
    {
        let ledger = self.inner.read().await;
        let mut found: Vec<Purchase> = ledger
            .purchases
            .values()
            .filter(|p| keep(p))
            .cloned()
            .collect();
        found.sort_by_key(|p| p.created_at);
        found
    }

    /// Clones every purchase for snapshotting.
    pub async fn snapshot(&self) -> Vec<Purchase> {
        self.inner.read().await.purchases.values().cloned().collect()
    }

    /// Loads purchases restored from persistence and rebuilds the key
    /// index. Returns how many were loaded.
    pub async fn restore(&self, purchases: Vec<Purchase>) -> usize {
        let mut ledger = self.inner.write().await;
        let count = purchases.len();
        for purchase in purchases {
            if let Some(key) = purchase.idempotency_key.clone() {
                ledger
                    .keys
                    .insert((purchase.account_id, key), KeyState::Completed(purchase.id));
            }
            ledger.purchases.insert(purchase.id, purchase);
        }
        count
    }
}
