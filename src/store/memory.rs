use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{
    ledger::{Account, Transaction},
    users::UserProfile,
};

use super::{LedgerStore, ProfileStore, StoreError};

/// In-process backend. One write lock makes every `commit` atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    transactions: HashMap<String, Vec<Transaction>>,
    users: HashMap<String, UserProfile>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn get_account(&self, user_id: &str) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.get(user_id).cloned())
    }

    async fn put_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .accounts
            .insert(account.user_id.clone(), account.clone());
        Ok(())
    }

    async fn append_transaction(&self, tx: &Transaction) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .transactions
            .entry(tx.user_id.clone())
            .or_default()
            .push(tx.clone());
        Ok(())
    }

    async fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.transactions.get(user_id).cloned().unwrap_or_default())
    }

    async fn commit(&self, account: &Account, tx: &Transaction) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .accounts
            .insert(account.user_id.clone(), account.clone());
        inner
            .transactions
            .entry(tx.user_id.clone())
            .or_default()
            .push(tx.clone());
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_user(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(uid).cloned())
    }

    async fn put_user(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.users.insert(profile.uid.clone(), profile.clone());
        Ok(())
    }

    async fn delete_user(&self, uid: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.users.remove(uid);
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserProfile>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}
