use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Per-user credit account.
///
/// `balance` never goes below zero in paid mode. In free launch mode the
/// balance is left untouched by debits, so it diverges from actual usage by
/// design. `total_purchased` and `total_used` are informational counters and
/// are never used to derive the balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub user_id: String,
    pub balance: i32,
    pub total_purchased: i32,
    pub total_used: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Account {
    pub fn new(user_id: impl Into<String>, initial_balance: i32, now: OffsetDateTime) -> Self {
        Self {
            user_id: user_id.into(),
            balance: initial_balance,
            total_purchased: 0,
            total_used: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Closed set of ledger entry kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    FreeGrant,
    Usage,
    Purchase,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FreeGrant => "free_grant",
            Self::Usage => "usage",
            Self::Purchase => "purchase",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "free_grant" => Some(Self::FreeGrant),
            "usage" => Some(Self::Usage),
            "purchase" => Some(Self::Purchase),
            _ => None,
        }
    }
}

/// Append-only audit trail entry. Immutable once written.
///
/// `amount` is signed: negative for debits, positive for credits.
/// `balance_after` snapshots the account balance right after the entry was
/// applied; in free mode that equals the balance right before it, because
/// free-mode debits do not decrement anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// v7 UUID, so ids are time-ordered within a user's log.
    pub id: Uuid,
    pub user_id: String,
    pub kind: TransactionKind,
    pub amount: i32,
    pub balance_after: i32,
    pub description: String,
    pub payment_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        user_id: impl Into<String>,
        kind: TransactionKind,
        amount: i32,
        balance_after: i32,
        description: impl Into<String>,
        payment_id: Option<String>,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: user_id.into(),
            kind,
            amount,
            balance_after,
            description: description.into(),
            payment_id,
            created_at: now,
        }
    }
}
