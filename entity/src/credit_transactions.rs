use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only ledger entry. Rows are never updated or deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "credit_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    /// One of "free_grant", "usage", "purchase".
    pub kind: String,
    /// Signed: negative for debits, positive for credits.
    pub amount: i32,
    pub balance_after: i32,
    pub description: String,
    pub payment_id: Option<String>,
    pub created_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::credit_accounts::Entity",
        from = "Column::UserId",
        to = "super::credit_accounts::Column::UserId"
    )]
    CreditAccounts,
}

impl Related<super::credit_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
