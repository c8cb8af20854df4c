use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

use crate::models::{
    ledger::{Account, Transaction},
    users::UserProfile,
};

use super::{LedgerStore, ProfileStore, StoreError};

const CREDITS_FILE: &str = "credits.json";
const TRANSACTIONS_FILE: &str = "transactions.json";
const USERS_FILE: &str = "users.json";

/// Flat-file backend: one pretty-printed JSON map per concern under the data
/// directory. Writes are single-writer serialized behind `io_lock`, which also
/// makes `commit` (two file writes) atomic with respect to other store calls.
/// Files are replaced via a temp-file rename so a crashed write never leaves a
/// truncated map behind.
pub struct JsonFileStore {
    data_dir: PathBuf,
    io_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens the store, creating the data directory and empty map files on
    /// first use.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir).await?;

        let store = Self {
            data_dir,
            io_lock: Mutex::new(()),
        };

        for file in [CREDITS_FILE, TRANSACTIONS_FILE, USERS_FILE] {
            let path = store.path(file);
            if tokio::fs::try_exists(&path).await? {
                continue;
            }
            store.write_map(file, &HashMap::<String, ()>::new()).await?;
        }

        Ok(store)
    }

    fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    async fn read_map<T: DeserializeOwned>(
        &self,
        file: &str,
    ) -> Result<HashMap<String, T>, StoreError> {
        let path = self.path(file);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(HashMap::new());
        }
        let bytes = tokio::fs::read(&path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_map<T: Serialize>(
        &self,
        file: &str,
        map: &HashMap<String, T>,
    ) -> Result<(), StoreError> {
        let path = self.path(file);
        let tmp = tmp_path(&path);
        let bytes = serde_json::to_vec_pretty(map)?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[async_trait]
impl LedgerStore for JsonFileStore {
    async fn get_account(&self, user_id: &str) -> Result<Option<Account>, StoreError> {
        let _guard = self.io_lock.lock().await;
        let accounts: HashMap<String, Account> = self.read_map(CREDITS_FILE).await?;
        Ok(accounts.get(user_id).cloned())
    }

    async fn put_account(&self, account: &Account) -> Result<(), StoreError> {
        let _guard = self.io_lock.lock().await;
        let mut accounts: HashMap<String, Account> = self.read_map(CREDITS_FILE).await?;
        accounts.insert(account.user_id.clone(), account.clone());
        self.write_map(CREDITS_FILE, &accounts).await
    }

    async fn append_transaction(&self, tx: &Transaction) -> Result<(), StoreError> {
        let _guard = self.io_lock.lock().await;
        let mut transactions: HashMap<String, Vec<Transaction>> =
            self.read_map(TRANSACTIONS_FILE).await?;
        transactions
            .entry(tx.user_id.clone())
            .or_default()
            .push(tx.clone());
        self.write_map(TRANSACTIONS_FILE, &transactions).await
    }

    async fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, StoreError> {
        let _guard = self.io_lock.lock().await;
        let transactions: HashMap<String, Vec<Transaction>> =
            self.read_map(TRANSACTIONS_FILE).await?;
        Ok(transactions.get(user_id).cloned().unwrap_or_default())
    }

    async fn commit(&self, account: &Account, tx: &Transaction) -> Result<(), StoreError> {
        let _guard = self.io_lock.lock().await;

        let mut accounts: HashMap<String, Account> = self.read_map(CREDITS_FILE).await?;
        let mut transactions: HashMap<String, Vec<Transaction>> =
            self.read_map(TRANSACTIONS_FILE).await?;

        accounts.insert(account.user_id.clone(), account.clone());
        transactions
            .entry(tx.user_id.clone())
            .or_default()
            .push(tx.clone());

        // Trail first, balance second
        self.write_map(TRANSACTIONS_FILE, &transactions).await?;
        self.write_map(CREDITS_FILE, &accounts).await
    }
}

#[async_trait]
impl ProfileStore for JsonFileStore {
    async fn get_user(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        let _guard = self.io_lock.lock().await;
        let users: HashMap<String, UserProfile> = self.read_map(USERS_FILE).await?;
        Ok(users.get(uid).cloned())
    }

    async fn put_user(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let _guard = self.io_lock.lock().await;
        let mut users: HashMap<String, UserProfile> = self.read_map(USERS_FILE).await?;
        users.insert(profile.uid.clone(), profile.clone());
        self.write_map(USERS_FILE, &users).await
    }

    async fn delete_user(&self, uid: &str) -> Result<(), StoreError> {
        let _guard = self.io_lock.lock().await;
        let mut users: HashMap<String, UserProfile> = self.read_map(USERS_FILE).await?;
        users.remove(uid);
        self.write_map(USERS_FILE, &users).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserProfile>, StoreError> {
        let _guard = self.io_lock.lock().await;
        let users: HashMap<String, UserProfile> = self.read_map(USERS_FILE).await?;
        Ok(users.values().find(|u| u.username == username).cloned())
    }
}
