//! Pet repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::pets::{self, PhotoList};
use crate::entities::sea_orm_active_enums::{Gender, PetColor, PetType};
use pettrack_shared::types::PageRequest;

/// Fields for registering a pet.
#[derive(Debug, Clone)]
pub struct NewPet {
    /// Pet name.
    pub pet_name: String,
    /// Species.
    pub pet_type: PetType,
    /// Breed.
    pub breed: String,
    /// Gender.
    pub gender: Gender,
    /// Coat color.
    pub color: PetColor,
    /// Free-text home location.
    pub home_location: String,
    /// Profile image URL, if one was uploaded.
    pub profile_image: Option<String>,
    /// Owning user.
    pub owner_id: Uuid,
}

/// Fields for a pet profile update.
///
/// `is_lost`/`is_found` are deliberately absent: the only writers of those
/// flags are the mark-lost/mark-found operations.
#[derive(Debug, Clone)]
pub struct PetUpdate {
    /// Pet name.
    pub pet_name: String,
    /// Species.
    pub pet_type: PetType,
    /// Breed.
    pub breed: String,
    /// Gender.
    pub gender: Gender,
    /// Coat color.
    pub color: PetColor,
    /// Free-text home location.
    pub home_location: String,
    /// Owning user.
    pub owner_id: Uuid,
}

/// Equality filters for pet listing.
///
/// Malformed values are dropped at construction so public listing endpoints
/// return the broader unfiltered result instead of erroring.
#[derive(Debug, Clone, Default)]
pub struct PetFilter {
    /// Filter by owner.
    pub owner_id: Option<Uuid>,
    /// Filter by species.
    pub pet_type: Option<PetType>,
    /// Filter by lost flag.
    pub is_lost: Option<bool>,
    /// Filter by found flag.
    pub is_found: Option<bool>,
}

impl PetFilter {
    /// Builds a filter from raw query-string values, ignoring anything that
    /// does not parse.
    #[must_use]
    pub fn parse(
        owner_id: Option<&str>,
        pet_type: Option<&str>,
        is_lost: Option<&str>,
        is_found: Option<&str>,
    ) -> Self {
        Self {
            owner_id: owner_id.and_then(|s| Uuid::parse_str(s).ok()),
            pet_type: pet_type.and_then(|s| s.parse().ok()),
            is_lost: is_lost.and_then(parse_bool),
            is_found: is_found.and_then(parse_bool),
        }
    }

    fn condition(&self) -> Condition {
        let mut condition = Condition::all().add(pets::Column::IsActive.eq(true));
        if let Some(owner_id) = self.owner_id {
            condition = condition.add(pets::Column::OwnerId.eq(owner_id));
        }
        if let Some(pet_type) = self.pet_type {
            condition = condition.add(pets::Column::PetType.eq(pet_type));
        }
        if let Some(is_lost) = self.is_lost {
            condition = condition.add(pets::Column::IsLost.eq(is_lost));
        }
        if let Some(is_found) = self.is_found {
            condition = condition.add(pets::Column::IsFound.eq(is_found));
        }
        condition
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Pet repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct PetRepository {
    db: DatabaseConnection,
}

impl PetRepository {
    /// Creates a new pet repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a new pet.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: NewPet) -> Result<pets::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let pet = pets::ActiveModel {
            id: Set(Uuid::new_v4()),
            pet_name: Set(input.pet_name),
            pet_type: Set(input.pet_type),
            breed: Set(input.breed),
            gender: Set(input.gender),
            color: Set(input.color),
            home_location: Set(input.home_location),
            profile_image: Set(input.profile_image),
            additional_photos: Set(PhotoList::default()),
            owner_id: Set(input.owner_id),
            is_active: Set(true),
            is_lost: Set(false),
            is_found: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        pet.insert(&self.db).await
    }

    /// Finds a pet by ID (regardless of `is_active`).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<pets::Model>, DbErr> {
        pets::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists active pets matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: &PetFilter,
        page: &PageRequest,
    ) -> Result<(Vec<pets::Model>, u64), DbErr> {
        let query = pets::Entity::find()
            .filter(filter.condition())
            .order_by_desc(pets::Column::CreatedAt);

        let total = query.clone().count(&self.db).await?;
        let items = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((items, total))
    }

    /// All active pets for an owner, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<pets::Model>, DbErr> {
        pets::Entity::find()
            .filter(pets::Column::OwnerId.eq(owner_id))
            .filter(pets::Column::IsActive.eq(true))
            .order_by_desc(pets::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Replaces a pet's profile fields. Returns `None` if the pet does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update(&self, id: Uuid, update: PetUpdate) -> Result<Option<pets::Model>, DbErr> {
        let Some(pet) = pets::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: pets::ActiveModel = pet.into();
        active.pet_name = Set(update.pet_name);
        active.pet_type = Set(update.pet_type);
        active.breed = Set(update.breed);
        active.gender = Set(update.gender);
        active.color = Set(update.color);
        active.home_location = Set(update.home_location);
        active.owner_id = Set(update.owner_id);
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
    ) -> Result<Option<pets::Model>, DbErr> {
        let Some(pet) = pets::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: pets::ActiveModel = pet.into();
        active.profile_image = Set(url);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await.map(Some)
    }

    /// Appends a batch of photo URLs in one update. Returns the new total,
    /// or `None` if the pet does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn append_photos(
        &self,
        id: Uuid,
        urls: Vec<String>,
    ) -> Result<Option<usize>, DbErr> {
        let Some(pet) = pets::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut photos = pet.additional_photos.clone();
        photos.0.extend(urls);
        let total = photos.len();

        let mut active: pets::ActiveModel = pet.into();
        active.additional_photos = Set(photos);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await?;

        Ok(Some(total))
    }

    /// Marks a pet as lost, clearing the found flag. Returns `None` if the
    /// pet does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn mark_lost(&self, id: Uuid) -> Result<Option<pets::Model>, DbErr> {
        self.set_status_flags(id, true, false).await
    }

    /// Marks a pet as found, clearing the lost flag. Returns `None` if the
    /// pet does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn mark_found(&self, id: Uuid) -> Result<Option<pets::Model>, DbErr> {
        self.set_status_flags(id, false, true).await
    }

    async fn set_status_flags(
        &self,
        id: Uuid,
        is_lost: bool,
        is_found: bool,
    ) -> Result<Option<pets::Model>, DbErr> {
        let Some(pet) = pets::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: pets::ActiveModel = pet.into();
        active.is_lost = Set(is_lost);
        active.is_found = Set(is_found);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await.map(Some)
    }

    /// Soft-deletes a pet. Returns `None` if the pet does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn soft_delete(&self, id: Uuid) -> Result<Option<pets::Model>, DbErr> {
        let Some(pet) = pets::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: pets::ActiveModel = pet.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await.map(Some)
    }

    /// Hard-deletes every pet owned by a user (account-deletion cascade).
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete_by_owner(&self, owner_id: Uuid) -> Result<u64, DbErr> {
        let result = pets::Entity::delete_many()
            .filter(pets::Column::OwnerId.eq(owner_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parse_valid_values() {
        let owner = Uuid::new_v4();
        let owner_str = owner.to_string();
        let filter = PetFilter::parse(
            Some(owner_str.as_str()),
            Some("Dog"),
            Some("true"),
            Some("false"),
        );

        assert_eq!(filter.owner_id, Some(owner));
        assert_eq!(filter.pet_type, Some(PetType::Dog));
        assert_eq!(filter.is_lost, Some(true));
        assert_eq!(filter.is_found, Some(false));
    }

    #[test]
    fn test_filter_parse_ignores_malformed_values() {
        // A malformed owner id widens the result set instead of erroring.
        let filter = PetFilter::parse(
            Some("not-a-uuid"),
            Some("Dragon"),
            Some("yes"),
            Some("TRUE"),
        );

        assert!(filter.owner_id.is_none());
        assert!(filter.pet_type.is_none());
        assert!(filter.is_lost.is_none());
        assert!(filter.is_found.is_none());
    }

    #[test]
    fn test_filter_parse_absent_values() {
        let filter = PetFilter::parse(None, None, None, None);
        assert!(filter.owner_id.is_none());
        assert!(filter.pet_type.is_none());
        assert!(filter.is_lost.is_none());
        assert!(filter.is_found.is_none());
    }
}
