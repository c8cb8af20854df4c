use async_trait::async_trait;
use sea_orm::{
    entity::*, query::*, sea_query::OnConflict, Database, DatabaseConnection, TransactionTrait,
};

use crate::models::{
    ledger::{Account, Transaction, TransactionKind},
    users::UserProfile,
};

use migration::MigratorTrait;

use super::{LedgerStore, ProfileStore, StoreError};

/// sea-orm backend over Postgres. `commit` wraps the balance upsert and the
/// ledger insert in one database transaction.
pub struct SqlStore {
    db: DatabaseConnection,
}

impl SqlStore {
    /// Connect and bring the schema up to date.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let db = Database::connect(url).await?;
        migration::Migrator::up(&db, None).await?;
        Ok(Self { db })
    }

    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn account_upsert(account: &Account) -> sea_orm::Insert<entity::credit_accounts::ActiveModel> {
        let model = entity::credit_accounts::ActiveModel {
            user_id: Set(account.user_id.clone()),
            balance: Set(account.balance),
            total_purchased: Set(account.total_purchased),
            total_used: Set(account.total_used),
            created_at: Set(account.created_at),
            updated_at: Set(account.updated_at),
        };

        entity::credit_accounts::Entity::insert(model).on_conflict(
            OnConflict::column(entity::credit_accounts::Column::UserId)
                .update_columns([
                    entity::credit_accounts::Column::Balance,
                    entity::credit_accounts::Column::TotalPurchased,
                    entity::credit_accounts::Column::TotalUsed,
                    entity::credit_accounts::Column::UpdatedAt,
                ])
                .to_owned(),
        )
    }

    fn transaction_insert(
        tx: &Transaction,
    ) -> sea_orm::Insert<entity::credit_transactions::ActiveModel> {
        entity::credit_transactions::Entity::insert(entity::credit_transactions::ActiveModel {
            id: Set(tx.id),
            user_id: Set(tx.user_id.clone()),
            kind: Set(tx.kind.as_str().to_string()),
            amount: Set(tx.amount),
            balance_after: Set(tx.balance_after),
            description: Set(tx.description.clone()),
            payment_id: Set(tx.payment_id.clone()),
            created_at: Set(tx.created_at),
        })
    }
}

fn account_from_model(model: entity::credit_accounts::Model) -> Account {
    Account {
        user_id: model.user_id,
        balance: model.balance,
        total_purchased: model.total_purchased,
        total_used: model.total_used,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn transaction_from_model(
    model: entity::credit_transactions::Model,
) -> Result<Transaction, StoreError> {
    let kind = TransactionKind::from_str(&model.kind).ok_or_else(|| {
        StoreError::Corrupt(format!(
            "unknown transaction kind '{}' for entry {}",
            model.kind, model.id
        ))
    })?;

    Ok(Transaction {
        id: model.id,
        user_id: model.user_id,
        kind,
        amount: model.amount,
        balance_after: model.balance_after,
        description: model.description,
        payment_id: model.payment_id,
        created_at: model.created_at,
    })
}

fn profile_from_model(model: entity::user_profiles::Model) -> UserProfile {
    UserProfile {
        uid: model.uid,
        email: model.email,
        username: model.username,
        role: model.role,
        avatar_url: model.avatar_url,
        bio: model.bio,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

#[async_trait]
impl LedgerStore for SqlStore {
    async fn get_account(&self, user_id: &str) -> Result<Option<Account>, StoreError> {
        let model = entity::credit_accounts::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?;
        Ok(model.map(account_from_model))
    }

    async fn put_account(&self, account: &Account) -> Result<(), StoreError> {
        Self::account_upsert(account).exec(&self.db).await?;
        Ok(())
    }

    async fn append_transaction(&self, tx: &Transaction) -> Result<(), StoreError> {
        Self::transaction_insert(tx).exec(&self.db).await?;
        Ok(())
    }

    async fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, StoreError> {
        let models = entity::credit_transactions::Entity::find()
            .filter(entity::credit_transactions::Column::UserId.eq(user_id))
            .order_by_asc(entity::credit_transactions::Column::CreatedAt)
            .order_by_asc(entity::credit_transactions::Column::Id)
            .all(&self.db)
            .await?;

        models.into_iter().map(transaction_from_model).collect()
    }

    async fn commit(&self, account: &Account, tx: &Transaction) -> Result<(), StoreError> {
        let txn = self.db.begin().await?;

        Self::account_upsert(account).exec(&txn).await?;
        Self::transaction_insert(tx).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for SqlStore {
    async fn get_user(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        let model = entity::user_profiles::Entity::find_by_id(uid)
            .one(&self.db)
            .await?;
        Ok(model.map(profile_from_model))
    }

    async fn put_user(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let model = entity::user_profiles::ActiveModel {
            uid: Set(profile.uid.clone()),
            email: Set(profile.email.clone()),
            username: Set(profile.username.clone()),
            role: Set(profile.role.clone()),
            avatar_url: Set(profile.avatar_url.clone()),
            bio: Set(profile.bio.clone()),
            created_at: Set(profile.created_at),
            updated_at: Set(profile.updated_at),
        };

        entity::user_profiles::Entity::insert(model)
            .on_conflict(
                OnConflict::column(entity::user_profiles::Column::Uid)
                    .update_columns([
                        entity::user_profiles::Column::Email,
                        entity::user_profiles::Column::Username,
                        entity::user_profiles::Column::Role,
                        entity::user_profiles::Column::AvatarUrl,
                        entity::user_profiles::Column::Bio,
                        entity::user_profiles::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn delete_user(&self, uid: &str) -> Result<(), StoreError> {
        entity::user_profiles::Entity::delete_by_id(uid)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserProfile>, StoreError> {
        let model = entity::user_profiles::Entity::find()
            .filter(entity::user_profiles::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        Ok(model.map(profile_from_model))
    }
}
