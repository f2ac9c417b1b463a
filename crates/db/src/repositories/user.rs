//! User repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::AuthProvider;
use crate::entities::users::{self, Address, NotificationPreferences};
use pettrack_shared::types::PageRequest;

/// Fields for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Email (lowercased by the caller).
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Argon2id hash; `None` for federated accounts.
    pub password_hash: Option<String>,
    /// Authentication provider.
    pub auth_provider: AuthProvider,
    /// Provider-assigned uid for federated accounts.
    pub provider_uid: Option<String>,
    /// Profile image URL.
    pub profile_image: Option<String>,
    /// Postal address.
    pub address: Option<Address>,
    /// Whether the provider has already verified the email.
    pub is_email_verified: bool,
}

/// Optional fields for a profile update.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New email (lowercased by the caller).
    pub email: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New postal address.
    pub address: Option<Address>,
    /// New notification preferences.
    pub notifications: Option<NotificationPreferences>,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails (including uniqueness
    /// violations on email or phone).
    pub async fn create(&self, input: NewUser) -> Result<users::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            password_hash: Set(input.password_hash),
            auth_provider: Set(input.auth_provider),
            provider_uid: Set(input.provider_uid),
            profile_image: Set(input.profile_image),
            address: Set(input.address),
            notifications: Set(NotificationPreferences::default()),
            is_active: Set(true),
            is_verified: Set(false),
            is_email_verified: Set(input.is_email_verified),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        user.insert(&self.db).await
    }

    /// Finds a user by ID (regardless of `is_active`).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Finds a user by phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Phone.eq(phone))
            .one(&self.db)
            .await
    }

    /// Finds a user by provider uid.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_provider_uid(&self, uid: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::ProviderUid.eq(uid))
            .one(&self.db)
            .await
    }

    /// Checks whether a user exists with the given email or phone.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_or_phone_exists(&self, email: &str, phone: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(
                users::Column::Email
                    .eq(email)
                    .or(users::Column::Phone.eq(phone)),
            )
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Lists active users, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_active(&self, page: &PageRequest) -> Result<(Vec<users::Model>, u64), DbErr> {
        let query = users::Entity::find()
            .filter(users::Column::IsActive.eq(true))
            .order_by_desc(users::Column::CreatedAt);

        let total = query.clone().count(&self.db).await?;
        let items = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((items, total))
    }

    /// Applies a partial profile update. Returns `None` if the user does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update(
        &self,
        id: Uuid,
        update: UserUpdate,
    ) -> Result<Option<users::Model>, DbErr> {
        let Some(user) = users::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(email) = update.email {
            active.email = Set(Some(email));
        }
        if let Some(phone) = update.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = update.address {
            active.address = Set(Some(address));
        }
        if let Some(notifications) = update.notifications {
            active.notifications = Set(notifications);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(&self.db).await.map(Some)
    }

    /// Overwrites the profile-image URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn set_profile_image(
        &self,
        id: Uuid,
        url: Option<String>,
    ) -> Result<Option<users::Model>, DbErr> {
        let Some(user) = users::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        active.profile_image = Set(url);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await.map(Some)
    }

    /// Links a federated provider uid to an existing account. Returns `None`
    /// if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn link_provider(
        &self,
        id: Uuid,
        provider_uid: &str,
    ) -> Result<Option<users::Model>, DbErr> {
        let Some(user) = users::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        active.provider_uid = Set(Some(provider_uid.to_string()));
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await.map(Some)
    }

    /// Records a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn record_login(&self, id: Uuid) -> Result<(), DbErr> {
        let Some(user) = users::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(());
        };

        let mut active: users::ActiveModel = user.into();
        active.last_login_at = Set(Some(chrono::Utc::now().into()));
        active.update(&self.db).await?;
        Ok(())
    }

    /// Marks the account as verified. Returns `None` if the user does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn verify(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        let Some(user) = users::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        active.is_verified = Set(true);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await.map(Some)
    }

    /// Replaces the notification preferences. Returns `None` if the user
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn set_notifications(
        &self,
        id: Uuid,
        notifications: NotificationPreferences,
    ) -> Result<Option<users::Model>, DbErr> {
        let Some(user) = users::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        active.notifications = Set(notifications);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await.map(Some)
    }

    /// Soft-deletes a user. Returns `None` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn soft_delete(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        let Some(user) = users::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await.map(Some)
    }
}
