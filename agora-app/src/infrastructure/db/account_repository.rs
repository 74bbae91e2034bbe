use super::db_error;
use super::entities::{account, Account as AccountEntity};
use crate::application::ports::AccountStore;
use crate::domain::{Account, AccountId, NewAccount, Role};
use agora_errors::AppError;
use sea_orm::{entity::*, query::*, DatabaseConnection};

#[derive(Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl TryFrom<account::Model> for Account {
    type Error = AppError;

    fn try_from(model: account::Model) -> Result<Self, Self::Error> {
        let role = model
            .role
            .parse::<Role>()
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(Self {
            id: model.id,
            identity_user_id: model.user_id,
            full_name: model.full_name,
            image_url: model.image_url,
            role,
        })
    }
}

impl AccountStore for AccountRepository {
    async fn find_by_identity(&self, identity_user_id: &str) -> Result<Option<Account>, AppError> {
        AccountEntity::find()
            .filter(account::Column::UserId.eq(identity_user_id))
            .one(&self.db)
            .await
            .map_err(db_error)?
            .map(Account::try_from)
            .transpose()
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AppError> {
        AccountEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .map(Account::try_from)
            .transpose()
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, AppError> {
        let active = account::ActiveModel {
            user_id: Set(account.identity_user_id),
            full_name: Set(account.full_name),
            image_url: Set(account.image_url),
            role: Set(account.role.as_str().to_string()),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        active.insert(&self.db).await.map_err(db_error)?.try_into()
    }

    async fn update_profile(
        &self,
        id: AccountId,
        full_name: String,
        image_url: Option<String>,
    ) -> Result<Account, AppError> {
        let existing = AccountEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or_else(|| AppError::NotFound("Compte".to_string()))?;

        let mut active: account::ActiveModel = existing.into();
        active.full_name = Set(full_name);
        if image_url.is_some() {
            active.image_url = Set(image_url);
        }
        active.update(&self.db).await.map_err(db_error)?.try_into()
    }
}
