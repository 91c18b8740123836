//! Account storage with a unique, case-insensitive email index.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::AccountId;
use super::account::Account;
use crate::error::TicketingError;

#[derive(Debug, Default)]
struct Directory {
    accounts: HashMap<AccountId, Account>,
    by_email: HashMap<String, AccountId>,
}

/// Central store for all accounts.
///
/// Email uniqueness is checked and enforced under the same write guard as
/// the insert, so two concurrent registrations with one address cannot
/// both succeed.
#[derive(Debug, Default)]
pub struct AccountDirectory {
    inner: RwLock<Directory>,
}

impl AccountDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new account.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::EmailTaken`] if the email is registered.
    pub async fn insert(&self, account: Account) -> Result<AccountId, TicketingError> {
        let mut dir = self.inner.write().await;
        if dir.by_email.contains_key(&account.email) {
            return Err(TicketingError::EmailTaken(account.email));
        }
        let id = account.id;
        dir.by_email.insert(account.email.clone(), id);
        dir.accounts.insert(id, account);
        Ok(id)
    }

    /// Returns a copy of the account.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::AccountNotFound`] for an unknown ID.
    pub async fn get(&self, id: AccountId) -> Result<Account, TicketingError> {
        self.inner
            .read()
            .await
            .accounts
            .get(&id)
            .cloned()
            .ok_or(TicketingError::AccountNotFound(*id.as_uuid()))
    }

    /// Looks an account up by email, ignoring case and surrounding spaces.
    pub async fn find_by_email(&self, email: &str) -> Option<Account> {
        let key = email.trim().to_lowercase();
        let dir = self.inner.read().await;
        dir.by_email
            .get(&key)
            .and_then(|id| dir.accounts.get(id))
            .cloned()
    }

    /// Applies `f` to the stored account and returns its result.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::AccountNotFound`] for an unknown ID.
    pub async fn update<F, R>(&self, id: AccountId, f: F) -> Result<R, TicketingError>
    where
        F: FnOnce(&mut Account) -> R,
    {
        let mut dir = self.inner.write().await;
        let account = dir
            .accounts
            .get_mut(&id)
            .ok_or(TicketingError::AccountNotFound(*id.as_uuid()))?;
        Ok(f(account))
    }

    /// Clones every account for snapshotting.
    pub async fn snapshot(&self) -> Vec<Account> {
        self.inner.read().await.accounts.values().cloned().collect()
    }

    /// Loads accounts restored from persistence. Returns how many were
    /// loaded; accounts whose email is already taken by another ID are
    /// skipped.
    pub async fn restore(&self, accounts: Vec<Account>) -> usize {
        let mut dir = self.inner.write().await;
        let mut loaded = 0;
        for account in accounts {
            match dir.by_email.get(&account.email) {
                Some(existing) if *existing != account.id => {
                    tracing::warn!(account_id = %account.id, "skipping restored account with duplicate email");
                    continue;
                }
                _ => {}
            }
            dir.by_email.insert(account.email.clone(), account.id);
            dir.accounts.insert(account.id, account);
            loaded += 1;
        }
        loaded
    }

    /// Returns the number of accounts.
    pub async fn len(&self) -> usize {
        self.inner.read().await.accounts.len()
    }

    /// Returns `true` if no account is registered.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.accounts.is_empty()
    }

    /// Holds a read lock on the directory until the guard drops.
    #[cfg(test)]
    pub(crate) async fn hold_read(&self) -> tokio::sync::RwLockReadGuard<'_, ()> {
        tokio::sync::RwLockReadGuard::map(self.inner.read().await, |_| &())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::account::{NewAccount, Role};

    fn account(email: &str) -> Account {
        let Ok(account) = Account::create(NewAccount {
            role: Role::Organizer,
            name: "Kemi".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            age: None,
            gender: None,
            city: None,
            phone: None,
        }) else {
            panic!("valid account");
        };
        account
    }

    #[tokio::test]
    async fn duplicate_email_rejected_case_insensitively() {
        let dir = AccountDirectory::new();
        assert!(dir.insert(account("kemi@chillr.app")).await.is_ok());
        let result = dir.insert(account("KEMI@chillr.app")).await;
        assert!(matches!(result, Err(TicketingError::EmailTaken(_))));
        assert_eq!(dir.len().await, 1);
    }

    #[tokio::test]
    async fn find_by_email_ignores_case() {
        let dir = AccountDirectory::new();
        let Ok(id) = dir.insert(account("kemi@chillr.app")).await else {
            panic!("insert failed");
        };
        let found = dir.find_by_email(" Kemi@Chillr.App ").await;
        assert_eq!(found.map(|a| a.id), Some(id));
        assert!(dir.find_by_email("nobody@chillr.app").await.is_none());
    }

    #[tokio::test]
    async fn update_mutates_in_place() {
        let dir = AccountDirectory::new();
        let Ok(id) = dir.insert(account("kemi@chillr.app")).await else {
            panic!("insert failed");
        };
        let result = dir.update(id, |a| a.city = Some("Accra".to_string())).await;
        assert!(result.is_ok());
        let city = dir.get(id).await.ok().and_then(|a| a.city);
        assert_eq!(city.as_deref(), Some("Accra"));
        assert!(dir.update(AccountId::new(), |_| ()).await.is_err());
    }

    #[tokio::test]
    async fn restore_skips_conflicting_email() {
        let dir = AccountDirectory::new();
        let _ = dir.insert(account("kemi@chillr.app")).await;
        let loaded = dir
            .restore(vec![account("kemi@chillr.app"), account("tobi@chillr.app")])
            .await;
        assert_eq!(loaded, 1);
        assert_eq!(dir.len().await, 2);
    }
}
