//! `UserDirectory` implementation for the background trigger handlers.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::AuthProvider;
use crate::entities::users::{self, NotificationPreferences};
use crate::repositories::{PetRepository, ReportRepository};
use pettrack_core::triggers::{DeletedUser, NewProfile, TriggerError, UserDirectory};

fn record_err(e: sea_orm::DbErr) -> TriggerError {
    TriggerError::Record(e.to_string())
}

/// Record-store adapter for trigger handlers.
#[derive(Debug, Clone)]
pub struct TriggerStore {
    db: DatabaseConnection,
}

impl TriggerStore {
    /// Creates a new trigger store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl UserDirectory for TriggerStore {
    async fn find_user_id_by_provider_uid(
        &self,
        provider_uid: &str,
    ) -> Result<Option<Uuid>, TriggerError> {
        users::Entity::find()
            .filter(users::Column::ProviderUid.eq(provider_uid))
            .one(&self.db)
            .await
            .map(|user| user.map(|u| u.id))
            .map_err(record_err)
    }

    async fn create_profile(&self, profile: NewProfile) -> Result<Uuid, TriggerError> {
        let now = chrono::Utc::now().into();
        let id = Uuid::new_v4();
        let user = users::ActiveModel {
            id: Set(id),
            name: Set(profile.name.unwrap_or_else(|| "New User".to_string())),
            email: Set(profile.email.map(|e| e.to_lowercase())),
            phone: Set(profile.phone),
            password_hash: Set(None),
            auth_provider: Set(AuthProvider::Google),
            provider_uid: Set(Some(profile.provider_uid)),
            profile_image: Set(profile.profile_image),
            address: Set(None),
            notifications: Set(NotificationPreferences::default()),
            is_active: Set(true),
            is_verified: Set(false),
            is_email_verified: Set(false),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        user.insert(&self.db).await.map_err(record_err)?;
        Ok(id)
    }

    async fn set_profile_image_url(
        &self,
        user_id: Uuid,
        url: String,
    ) -> Result<bool, TriggerError> {
        let Some(user) = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(record_err)?
            .filter(|u| u.is_active)
        else {
            return Ok(false);
        };

        let mut active: users::ActiveModel = user.into();
        active.profile_image = Set(Some(url));
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await.map_err(record_err)?;
        Ok(true)
    }

    async fn delete_pets_by_owner(&self, user_id: Uuid) -> Result<u64, TriggerError> {
        PetRepository::new(self.db.clone())
            .delete_by_owner(user_id)
            .await
            .map_err(record_err)
    }

    async fn delete_reports_by_user(&self, user_id: Uuid) -> Result<u64, TriggerError> {
        ReportRepository::new(self.db.clone())
            .delete_by_user(user_id)
            .await
            .map_err(record_err)
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<Option<DeletedUser>, TriggerError> {
        let Some(user) = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(record_err)?
        else {
            return Ok(None);
        };

        let deleted = DeletedUser {
            provider_uid: user.provider_uid.clone(),
            profile_image: user.profile_image.clone(),
        };

        user.delete(&self.db).await.map_err(record_err)?;
        Ok(Some(deleted))
    }
}
