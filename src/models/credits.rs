use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use super::ledger::{Transaction, TransactionKind};

fn default_amount() -> i32 {
    1
}

fn default_usage_description() -> String {
    "AI image generated".to_string()
}

/// Request to initialize a user's credit account
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InitAccountRequest {
    #[validate(length(min = 1, max = 255))]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitAccountResponse {
    pub success: bool,
    pub balance: i32,
    pub already_existed: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub success: bool,
    pub user_id: String,
    pub balance: i32,
    pub free_mode: bool,
}

/// Request to consume credits for a generation
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UseCreditsRequest {
    #[validate(length(min = 1, max = 255))]
    pub user_id: String,

    #[serde(default = "default_amount")]
    pub amount: i32,

    #[serde(default = "default_usage_description")]
    #[validate(length(max = 1024))]
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UseCreditsResponse {
    pub success: bool,
    pub credits_used: i32,
    pub new_balance: i32,
    pub free_mode: bool,
    pub message: String,
}

/// Request to grant credits (purchase stub or promotional grant)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GrantCreditsRequest {
    #[validate(length(min = 1, max = 255))]
    pub user_id: String,

    pub amount: i32,

    pub kind: TransactionKind,

    #[validate(length(max = 1024))]
    pub description: String,

    #[validate(length(max = 255))]
    pub payment_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantCreditsResponse {
    pub success: bool,
    pub new_balance: i32,
    pub total_purchased: i32,
}

/// Single audit trail entry as returned by the history endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub amount: i32,
    pub balance_after: i32,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Transaction> for TransactionRecord {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            kind: tx.kind,
            amount: tx.amount,
            balance_after: tx.balance_after,
            description: tx.description,
            payment_id: tx.payment_id,
            created_at: tx.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub success: bool,
    pub transactions: Vec<TransactionRecord>,
    pub total: usize,
    pub free_mode: bool,
}

/// Credit package shown in the storefront (display only during free launch)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditPackage {
    pub id: &'static str,
    pub name: &'static str,
    pub credits: i32,
    pub price_cents: i32,
    pub price_display: &'static str,
    pub badge: &'static str,
}

impl CreditPackage {
    /// The launch-period catalog: a single free package.
    pub fn launch_catalog(initial_grant: i32) -> Vec<Self> {
        vec![Self {
            id: "free",
            name: "Launch Special",
            credits: initial_grant,
            price_cents: 0,
            price_display: "FREE",
            badge: "Limited Time",
        }]
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagesResponse {
    pub success: bool,
    pub free_mode: bool,
    pub message: String,
    pub packages: Vec<CreditPackage>,
}

/// Payment system status (GET /api/v1/credits/status)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditSystemStatus {
    pub free_mode: bool,
    pub free_credits: i32,
    pub message: String,
    pub payments_enabled: bool,
}
