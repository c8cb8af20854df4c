// Persistence backends for the credit ledger and profile store.
//
// The backend is chosen once at startup: a configured database URL selects
// `SqlStore`, otherwise `JsonFileStore` keeps flat files under the data
// directory. `MemoryStore` backs tests and ephemeral deployments.

pub mod json_file;
pub mod memory;
pub mod sql;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use sql::SqlStore;

use async_trait::async_trait;

use crate::models::{
    ledger::{Account, Transaction},
    users::UserProfile,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("inconsistent record: {0}")]
    Corrupt(String),
}

/// Storage contract for the credit ledger.
///
/// `commit` persists an account update together with its ledger entry as one
/// atomic write; every balance-changing operation goes through it so a failure
/// can never leave the balance and the audit trail disagreeing.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn get_account(&self, user_id: &str) -> Result<Option<Account>, StoreError>;

    async fn put_account(&self, account: &Account) -> Result<(), StoreError>;

    async fn append_transaction(&self, tx: &Transaction) -> Result<(), StoreError>;

    /// All transactions for a user in insertion order (oldest first).
    async fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, StoreError>;

    /// Persist the account state and append the ledger entry atomically.
    async fn commit(&self, account: &Account, tx: &Transaction) -> Result<(), StoreError>;
}

/// Storage contract for user profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_user(&self, uid: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Insert or replace a profile.
    async fn put_user(&self, profile: &UserProfile) -> Result<(), StoreError>;

    async fn delete_user(&self, uid: &str) -> Result<(), StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserProfile>, StoreError>;
}
