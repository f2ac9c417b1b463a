//! `ImageRecordStore` implementation over the users and pets tables.

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entities::{pets, users};
use pettrack_core::asset::{AssetError, ImageOwner, ImageRecordStore};

/// Record-store adapter for the asset lifecycle coordinator.
#[derive(Debug, Clone)]
pub struct ImageStore {
    db: DatabaseConnection,
}

impl ImageStore {
    /// Creates a new image store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn live_user(&self, id: uuid::Uuid) -> Result<users::Model, AssetError> {
        users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AssetError::Record(e.to_string()))?
            .filter(|u| u.is_active)
            .ok_or(AssetError::EntityNotFound)
    }

    async fn live_pet(&self, id: uuid::Uuid) -> Result<pets::Model, AssetError> {
        pets::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AssetError::Record(e.to_string()))?
            .filter(|p| p.is_active)
            .ok_or(AssetError::EntityNotFound)
    }
}

impl ImageRecordStore for ImageStore {
    async fn profile_image(&self, owner: ImageOwner) -> Result<Option<String>, AssetError> {
        match owner {
            ImageOwner::User(id) => Ok(self.live_user(id).await?.profile_image),
            ImageOwner::Pet(id) => Ok(self.live_pet(id).await?.profile_image),
        }
    }

    async fn set_profile_image(
        &self,
        owner: ImageOwner,
        url: Option<String>,
    ) -> Result<(), AssetError> {
        let now = Set(chrono::Utc::now().into());
        match owner {
            ImageOwner::User(id) => {
                let mut active: users::ActiveModel = self.live_user(id).await?.into();
                active.profile_image = Set(url);
                active.updated_at = now;
                active
                    .update(&self.db)
                    .await
                    .map_err(|e| AssetError::Record(e.to_string()))?;
            }
            ImageOwner::Pet(id) => {
                let mut active: pets::ActiveModel = self.live_pet(id).await?.into();
                active.profile_image = Set(url);
                active.updated_at = now;
                active
                    .update(&self.db)
                    .await
                    .map_err(|e| AssetError::Record(e.to_string()))?;
            }
        }
        Ok(())
    }

    async fn append_photos(
        &self,
        owner: ImageOwner,
        urls: Vec<String>,
    ) -> Result<usize, AssetError> {
        let ImageOwner::Pet(id) = owner else {
            return Err(AssetError::PhotosNotSupported);
        };

        let pet = self.live_pet(id).await?;
        let mut photos = pet.additional_photos.clone();
        photos.0.extend(urls);
        let total = photos.len();

        let mut active: pets::ActiveModel = pet.into();
        active.additional_photos = Set(photos);
        active.updated_at = Set(chrono::Utc::now().into());
        active
            .update(&self.db)
            .await
            .map_err(|e| AssetError::Record(e.to_string()))?;

        Ok(total)
    }

    async fn image_urls(&self, owner: ImageOwner) -> Result<Vec<String>, AssetError> {
        match owner {
            ImageOwner::User(id) => Ok(self.live_user(id).await?.profile_image.into_iter().collect()),
            ImageOwner::Pet(id) => {
                let pet = self.live_pet(id).await?;
                let mut urls: Vec<String> = pet.profile_image.into_iter().collect();
                urls.extend(pet.additional_photos.0);
                Ok(urls)
            }
        }
    }
}
