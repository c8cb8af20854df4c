use std::collections::HashMap;
use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::{
    config::CreditsConfig,
    error::{ApiError, Result},
    models::ledger::{Account, Transaction, TransactionKind},
    store::LedgerStore,
};

/// Credit ledger core: per-user balances plus an append-only audit trail.
///
/// The launch-mode switch and the initial grant are injected at construction
/// and never change for the lifetime of the service, so tests can hold a free
/// and a paid ledger side by side.
pub struct CreditsService {
    store: Arc<dyn LedgerStore>,
    free_mode: bool,
    initial_grant: i32,
    // Serializes read-modify-write sequences per account. Different users
    // never contend on the same entry.
    account_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CreditsService {
    pub fn new(store: Arc<dyn LedgerStore>, config: &CreditsConfig) -> Self {
        Self {
            store,
            free_mode: config.free_mode,
            initial_grant: config.initial_grant,
            account_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn free_mode(&self) -> bool {
        self.free_mode
    }

    pub fn initial_grant(&self) -> i32 {
        self.initial_grant
    }

    async fn lock_for(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.account_locks.lock().await;
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Creates the account with the launch grant and its `free_grant` ledger
    /// entry. Caller must hold the per-account lock.
    async fn create_account(&self, user_id: &str) -> Result<Account> {
        let now = OffsetDateTime::now_utc();
        let account = Account::new(user_id, self.initial_grant, now);
        let tx = Transaction::record(
            user_id,
            TransactionKind::FreeGrant,
            self.initial_grant,
            self.initial_grant,
            format!("Launch Special - {} free credits", self.initial_grant),
            None,
            now,
        );

        self.store.commit(&account, &tx).await?;

        info!(
            "Initialized credit account: user={}, grant={}",
            user_id, self.initial_grant
        );

        Ok(account)
    }

    /// Current balance for a user.
    ///
    /// Not a pure read: an unknown `user_id` is initialized with the launch
    /// grant (and its `free_grant` ledger entry) before the balance is
    /// returned.
    #[instrument(skip(self))]
    pub async fn get_balance(&self, user_id: &str) -> Result<i32> {
        let lock = self.lock_for(user_id).await;
        let _guard = lock.lock().await;

        if let Some(account) = self.store.get_account(user_id).await? {
            return Ok(account.balance);
        }

        let account = self.create_account(user_id).await?;
        Ok(account.balance)
    }

    /// Idempotent account initialization. The boolean reports whether the
    /// account already existed; a repeat call changes nothing.
    #[instrument(skip(self))]
    pub async fn init_account(&self, user_id: &str) -> Result<(Account, bool)> {
        let lock = self.lock_for(user_id).await;
        let _guard = lock.lock().await;

        if let Some(account) = self.store.get_account(user_id).await? {
            return Ok((account, true));
        }

        let account = self.create_account(user_id).await?;
        Ok((account, false))
    }

    /// Consumes credits for a generation.
    ///
    /// Free mode always succeeds: the `usage` entry is appended with the
    /// unchanged balance and the account row is left untouched. Paid mode is
    /// all-or-nothing: the debit either applies atomically or fails with
    /// `InsufficientCredits` leaving no trace.
    #[instrument(skip(self, description))]
    pub async fn debit(&self, user_id: &str, amount: i32, description: &str) -> Result<DebitOutcome> {
        if amount <= 0 {
            return Err(ApiError::InvalidAmount(format!(
                "Debit amount must be positive, got {}",
                amount
            )));
        }

        let lock = self.lock_for(user_id).await;
        let _guard = lock.lock().await;

        let account = match self.store.get_account(user_id).await? {
            Some(account) => account,
            None => self.create_account(user_id).await?,
        };

        if self.free_mode {
            let tx = Transaction::record(
                user_id,
                TransactionKind::Usage,
                -amount,
                account.balance,
                format!("{} (FREE during beta)", description),
                None,
                OffsetDateTime::now_utc(),
            );
            self.store.append_transaction(&tx).await?;

            info!(
                "Logged free-mode usage: user={}, amount={}, balance={}",
                user_id, amount, account.balance
            );

            return Ok(DebitOutcome {
                credits_used: amount,
                new_balance: account.balance,
                free_mode: true,
            });
        }

        if account.balance < amount {
            return Err(ApiError::InsufficientCredits {
                requested: amount,
                balance: account.balance,
            });
        }

        let now = OffsetDateTime::now_utc();
        let mut updated = account;
        updated.balance -= amount;
        updated.total_used += amount;
        updated.updated_at = now;

        let tx = Transaction::record(
            user_id,
            TransactionKind::Usage,
            -amount,
            updated.balance,
            description,
            None,
            now,
        );

        self.store.commit(&updated, &tx).await?;

        info!(
            "Debited {} credits: user={}, new_balance={}",
            amount, user_id, updated.balance
        );

        Ok(DebitOutcome {
            credits_used: amount,
            new_balance: updated.balance,
            free_mode: false,
        })
    }

    /// Grants credits. Purchases always count, free launch period included.
    #[instrument(skip(self, description))]
    pub async fn credit(
        &self,
        user_id: &str,
        amount: i32,
        kind: TransactionKind,
        description: &str,
        payment_id: Option<String>,
    ) -> Result<Account> {
        if amount <= 0 {
            return Err(ApiError::InvalidAmount(format!(
                "Credit amount must be positive, got {}",
                amount
            )));
        }
        if kind == TransactionKind::Usage {
            return Err(ApiError::BadRequest(
                "Usage entries are produced by debits, not grants".to_string(),
            ));
        }

        let lock = self.lock_for(user_id).await;
        let _guard = lock.lock().await;

        let account = match self.store.get_account(user_id).await? {
            Some(account) => account,
            None => self.create_account(user_id).await?,
        };

        let now = OffsetDateTime::now_utc();
        let mut updated = account;
        updated.balance += amount;
        if kind == TransactionKind::Purchase {
            updated.total_purchased += amount;
        }
        updated.updated_at = now;

        let tx = Transaction::record(
            user_id,
            kind,
            amount,
            updated.balance,
            description,
            payment_id,
            now,
        );

        self.store.commit(&updated, &tx).await?;

        info!(
            "Credited {} credits ({}): user={}, new_balance={}",
            amount,
            kind.as_str(),
            user_id,
            updated.balance
        );

        Ok(updated)
    }

    /// Full audit trail for a user, newest first. Unknown users get an empty
    /// list, not an account.
    #[instrument(skip(self))]
    pub async fn get_history(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let mut transactions = self.store.list_transactions(user_id).await?;
        transactions.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(transactions)
    }
}

#[derive(Debug, Clone)]
pub struct DebitOutcome {
    pub credits_used: i32,
    pub new_balance: i32,
    pub free_mode: bool,
}
