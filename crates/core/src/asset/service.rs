//! Asset lifecycle coordinator implementation.

use std::sync::Arc;

use futures::future::{join_all, try_join_all};
use tracing::{info, warn};

use super::error::AssetError;
use super::types::{ImageOwner, UploadedImage};
use crate::storage::StorageService;

/// Record-store view of an image-owning entity.
///
/// Implemented by the db crate. Every method operates on live records only;
/// a soft-deleted or missing entity yields `AssetError::EntityNotFound`.
pub trait ImageRecordStore: Send + Sync {
    /// Current profile-image URL of the entity.
    fn profile_image(
        &self,
        owner: ImageOwner,
    ) -> impl std::future::Future<Output = Result<Option<String>, AssetError>> + Send;

    /// Overwrite the entity's profile-image URL.
    fn set_profile_image(
        &self,
        owner: ImageOwner,
        url: Option<String>,
    ) -> impl std::future::Future<Output = Result<(), AssetError>> + Send;

    /// Append a batch of photo URLs to the entity's photo list in one update.
    fn append_photos(
        &self,
        owner: ImageOwner,
        urls: Vec<String>,
    ) -> impl std::future::Future<Output = Result<usize, AssetError>> + Send;

    /// All image URLs held by the entity (profile image + photo list).
    fn image_urls(
        &self,
        owner: ImageOwner,
    ) -> impl std::future::Future<Output = Result<Vec<String>, AssetError>> + Send;
}

/// Coordinates uploads and deletions so records never reference objects
/// that do not exist.
pub struct AssetService<R: ImageRecordStore> {
    storage: Arc<StorageService>,
    repo: Arc<R>,
}

impl<R: ImageRecordStore> AssetService<R> {
    /// Create a new asset service.
    #[must_use]
    pub fn new(storage: Arc<StorageService>, repo: Arc<R>) -> Self {
        Self { storage, repo }
    }

    /// Validate and upload one image, returning its public URL.
    ///
    /// No record is touched here: the caller persists the URL only after
    /// this returns success, so a failed upload can never leave a partial
    /// reference behind.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the upload fails.
    pub async fn attach_image(
        &self,
        file: &UploadedImage,
        folder: &str,
    ) -> Result<String, AssetError> {
        self.storage
            .validate_image(&file.content_type, &file.filename, file.size())?;

        let key = StorageService::generate_object_key(folder, &file.filename);
        self.storage
            .upload(&key, file.bytes.clone(), &file.content_type)
            .await?;

        Ok(self.storage.public_url(&key))
    }

    /// Replace an entity's profile image.
    ///
    /// Uploads the new image first; only after upload success is the record
    /// overwritten, and only then is the previous object deleted. A failed
    /// delete of the old object is logged and swallowed: the record is
    /// already correct and the orphan is a cleanup concern, not a
    /// consistency concern.
    ///
    /// # Errors
    ///
    /// Returns an error if validation, the upload, or the record update
    /// fails. The old image reference is unchanged in every error case.
    pub async fn replace_profile_image(
        &self,
        owner: ImageOwner,
        file: &UploadedImage,
        folder: &str,
    ) -> Result<String, AssetError> {
        let old_url = self.repo.profile_image(owner).await?;

        let new_url = self.attach_image(file, folder).await?;
        self.repo
            .set_profile_image(owner, Some(new_url.clone()))
            .await?;

        if let Some(old) = old_url {
            self.delete_image(Some(old.as_str())).await;
        }

        Ok(new_url)
    }

    /// Append a batch of photos to an entity's photo list.
    ///
    /// The cap is checked before any upload begins. All uploads run
    /// concurrently; if any one fails the whole append is an error and the
    /// record is not touched (already-uploaded siblings become orphans).
    /// On success the full batch is appended in a single record update.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch is empty or over the cap, any upload
    /// fails, or the record update fails.
    pub async fn append_photos(
        &self,
        owner: ImageOwner,
        files: &[UploadedImage],
        folder: &str,
        max_count: usize,
    ) -> Result<Vec<String>, AssetError> {
        if files.is_empty() {
            return Err(AssetError::NoFiles);
        }
        if files.len() > max_count {
            return Err(AssetError::TooManyFiles {
                count: files.len(),
                max: max_count,
            });
        }

        // Validate everything up front so a bad file rejects the batch
        // before the first byte leaves the process.
        for file in files {
            self.storage
                .validate_image(&file.content_type, &file.filename, file.size())?;
        }

        let urls = try_join_all(files.iter().map(|file| self.attach_image(file, folder))).await?;

        let total = self.repo.append_photos(owner, urls.clone()).await?;
        info!(
            owner_id = %owner.id(),
            appended = urls.len(),
            total_photos = total,
            "Photo batch appended"
        );

        Ok(urls)
    }

    /// Best-effort deletion of every image the entity holds.
    ///
    /// Individual failures are logged and do not block the remaining
    /// deletions or the caller's subsequent soft delete. Returns the number
    /// of objects actually deleted.
    pub async fn remove_all_images(&self, owner: ImageOwner) -> usize {
        let urls = match self.repo.image_urls(owner).await {
            Ok(urls) => urls,
            Err(e) => {
                warn!(owner_id = %owner.id(), error = %e, "Could not list images for cleanup");
                return 0;
            }
        };

        let deleted = join_all(urls.iter().map(|url| self.delete_image(Some(url.as_str()))))
            .await
            .into_iter()
            .filter(|ok| *ok)
            .count();

        info!(
            owner_id = %owner.id(),
            requested = urls.len(),
            deleted,
            "Image cleanup finished"
        );
        deleted
    }

    /// Best-effort delete of a single image by its public URL.
    ///
    /// A missing/empty URL is a no-op. Failures are logged and swallowed.
    /// Returns whether the object was deleted.
    pub async fn delete_image(&self, url: Option<&str>) -> bool {
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            return false;
        };

        let key = match StorageService::key_from_url(url) {
            Ok(key) => key,
            Err(e) => {
                warn!(url, error = %e, "Could not derive storage key from URL");
                return false;
            }
        };

        match self.storage.delete(&key).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Image delete failed; leaving orphan");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StorageConfig, StorageProvider};
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Mock record store tracking profile images and photo lists in memory.
    #[derive(Default)]
    struct MockImageRecordStore {
        profiles: Mutex<HashMap<Uuid, Option<String>>>,
        photos: Mutex<HashMap<Uuid, Vec<String>>>,
        fail_writes: bool,
    }

    impl MockImageRecordStore {
        fn with_entity(id: Uuid, profile: Option<String>, photos: Vec<String>) -> Self {
            let store = Self::default();
            store.profiles.lock().unwrap().insert(id, profile);
            store.photos.lock().unwrap().insert(id, photos);
            store
        }

        fn failing_writes(id: Uuid) -> Self {
            let mut store = Self::with_entity(id, None, vec![]);
            store.fail_writes = true;
            store
        }
    }

    impl ImageRecordStore for MockImageRecordStore {
        async fn profile_image(&self, owner: ImageOwner) -> Result<Option<String>, AssetError> {
            self.profiles
                .lock()
                .unwrap()
                .get(&owner.id())
                .cloned()
                .ok_or(AssetError::EntityNotFound)
        }

        async fn set_profile_image(
            &self,
            owner: ImageOwner,
            url: Option<String>,
        ) -> Result<(), AssetError> {
            if self.fail_writes {
                return Err(AssetError::Record("write refused".into()));
            }
            self.profiles.lock().unwrap().insert(owner.id(), url);
            Ok(())
        }

        async fn append_photos(
            &self,
            owner: ImageOwner,
            urls: Vec<String>,
        ) -> Result<usize, AssetError> {
            if self.fail_writes {
                return Err(AssetError::Record("write refused".into()));
            }
            let mut photos = self.photos.lock().unwrap();
            let list = photos.entry(owner.id()).or_default();
            list.extend(urls);
            Ok(list.len())
        }

        async fn image_urls(&self, owner: ImageOwner) -> Result<Vec<String>, AssetError> {
            let mut urls = Vec::new();
            if let Some(Some(profile)) = self.profiles.lock().unwrap().get(&owner.id()) {
                urls.push(profile.clone());
            }
            if let Some(photos) = self.photos.lock().unwrap().get(&owner.id()) {
                urls.extend(photos.iter().cloned());
            }
            Ok(urls)
        }
    }

    fn test_storage() -> Arc<StorageService> {
        let root = std::env::temp_dir().join(format!("pettrack-asset-test-{}", Uuid::new_v4()));
        let config = StorageConfig::new(StorageProvider::local_fs(root));
        Arc::new(StorageService::from_config(config).expect("should create storage"))
    }

    fn image(name: &str) -> UploadedImage {
        UploadedImage {
            filename: name.to_string(),
            content_type: "image/png".to_string(),
            bytes: Bytes::from_static(b"\x89PNG\r\n\x1a\n"),
        }
    }

    #[tokio::test]
    async fn test_attach_image_returns_public_url() {
        let storage = test_storage();
        let repo = Arc::new(MockImageRecordStore::default());
        let service = AssetService::new(storage.clone(), repo);

        let url = service.attach_image(&image("buddy.png"), "pets").await.unwrap();

        assert!(url.contains("/pets/"));
        let key = StorageService::key_from_url(&url).unwrap();
        assert!(storage.exists(&key).await);
    }

    #[tokio::test]
    async fn test_attach_image_rejects_non_image_before_upload() {
        let storage = test_storage();
        let repo = Arc::new(MockImageRecordStore::default());
        let service = AssetService::new(storage, repo);

        let mut file = image("malware.exe");
        file.content_type = "application/octet-stream".to_string();

        let result = service.attach_image(&file, "pets").await;
        assert!(matches!(
            result,
            Err(AssetError::Storage(crate::storage::StorageError::NotAnImage { .. }))
        ));
    }

    #[tokio::test]
    async fn test_replace_profile_image_updates_record_and_deletes_old() {
        let storage = test_storage();
        let pet_id = Uuid::new_v4();
        let owner = ImageOwner::Pet(pet_id);

        // Seed an existing object and reference it from the record.
        let repo = Arc::new(MockImageRecordStore::with_entity(pet_id, None, vec![]));
        let service = AssetService::new(storage.clone(), repo.clone());
        let old_url = service
            .replace_profile_image(owner, &image("old.png"), "pets")
            .await
            .unwrap();
        let old_key = StorageService::key_from_url(&old_url).unwrap();
        assert!(storage.exists(&old_key).await);

        let new_url = service
            .replace_profile_image(owner, &image("new.png"), "pets")
            .await
            .unwrap();

        assert_ne!(new_url, old_url);
        assert_eq!(
            repo.profile_image(owner).await.unwrap(),
            Some(new_url.clone())
        );
        // Old object is cleaned up once the record points at the new one.
        assert!(!storage.exists(&old_key).await);
        let new_key = StorageService::key_from_url(&new_url).unwrap();
        assert!(storage.exists(&new_key).await);
    }

    #[tokio::test]
    async fn test_replace_profile_image_failed_upload_leaves_record_unchanged() {
        let storage = test_storage();
        let pet_id = Uuid::new_v4();
        let owner = ImageOwner::Pet(pet_id);
        let repo = Arc::new(MockImageRecordStore::with_entity(
            pet_id,
            Some("https://host/bucket/pets/kept.png".to_string()),
            vec![],
        ));
        let service = AssetService::new(storage, repo.clone());

        let mut bad = image("new.pdf");
        bad.content_type = "application/pdf".to_string();

        let result = service.replace_profile_image(owner, &bad, "pets").await;
        assert!(result.is_err());
        assert_eq!(
            repo.profile_image(owner).await.unwrap(),
            Some("https://host/bucket/pets/kept.png".to_string())
        );
    }

    #[tokio::test]
    async fn test_append_photos_all_or_nothing_on_record_failure() {
        let storage = test_storage();
        let pet_id = Uuid::new_v4();
        let owner = ImageOwner::Pet(pet_id);
        let repo = Arc::new(MockImageRecordStore::failing_writes(pet_id));
        let service = AssetService::new(storage, repo.clone());

        let files = vec![image("a.png"), image("b.png")];
        let result = service.append_photos(owner, &files, "pets", 5).await;

        assert!(matches!(result, Err(AssetError::Record(_))));
        // Record layer saw nothing appended.
        assert!(repo.photos.lock().unwrap().get(&pet_id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_photos_success_appends_full_batch() {
        let storage = test_storage();
        let pet_id = Uuid::new_v4();
        let owner = ImageOwner::Pet(pet_id);
        let repo = Arc::new(MockImageRecordStore::with_entity(
            pet_id,
            None,
            vec!["https://host/bucket/pets/existing.png".to_string()],
        ));
        let service = AssetService::new(storage, repo.clone());

        let files = vec![image("a.png"), image("b.png"), image("c.png")];
        let urls = service.append_photos(owner, &files, "pets", 5).await.unwrap();

        assert_eq!(urls.len(), 3);
        let photos = repo.photos.lock().unwrap().get(&pet_id).cloned().unwrap();
        assert_eq!(photos.len(), 4);
        for url in &urls {
            assert!(photos.contains(url));
        }
    }

    #[tokio::test]
    async fn test_append_photos_cap_rejected_before_upload() {
        let storage = test_storage();
        let pet_id = Uuid::new_v4();
        let owner = ImageOwner::Pet(pet_id);
        let repo = Arc::new(MockImageRecordStore::with_entity(pet_id, None, vec![]));
        let service = AssetService::new(storage, repo.clone());

        let files = vec![image("a.png"), image("b.png"), image("c.png")];
        let result = service.append_photos(owner, &files, "pets", 2).await;

        assert!(matches!(
            result,
            Err(AssetError::TooManyFiles { count: 3, max: 2 })
        ));
        assert!(repo.photos.lock().unwrap().get(&pet_id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_photos_empty_batch_rejected() {
        let storage = test_storage();
        let pet_id = Uuid::new_v4();
        let owner = ImageOwner::Pet(pet_id);
        let repo = Arc::new(MockImageRecordStore::with_entity(pet_id, None, vec![]));
        let service = AssetService::new(storage, repo);

        let result = service.append_photos(owner, &[], "pets", 5).await;
        assert!(matches!(result, Err(AssetError::NoFiles)));
    }

    #[tokio::test]
    async fn test_remove_all_images_deletes_profile_and_photos() {
        let storage = test_storage();
        let pet_id = Uuid::new_v4();
        let owner = ImageOwner::Pet(pet_id);
        let repo = Arc::new(MockImageRecordStore::with_entity(pet_id, None, vec![]));
        let service = AssetService::new(storage.clone(), repo.clone());

        let profile = service
            .replace_profile_image(owner, &image("profile.png"), "pets")
            .await
            .unwrap();
        let photos = service
            .append_photos(owner, &[image("a.png"), image("b.png")], "pets", 5)
            .await
            .unwrap();

        let deleted = service.remove_all_images(owner).await;
        assert_eq!(deleted, 3);

        for url in std::iter::once(&profile).chain(photos.iter()) {
            let key = StorageService::key_from_url(url).unwrap();
            assert!(!storage.exists(&key).await);
        }
    }

    #[tokio::test]
    async fn test_remove_all_images_missing_objects_do_not_block() {
        let storage = test_storage();
        let pet_id = Uuid::new_v4();
        let owner = ImageOwner::Pet(pet_id);
        // Record references objects that were never uploaded.
        let repo = Arc::new(MockImageRecordStore::with_entity(
            pet_id,
            Some("https://host/bucket/pets/ghost.png".to_string()),
            vec!["https://host/bucket/pets/ghost2.png".to_string()],
        ));
        let service = AssetService::new(storage, repo);

        // Must complete without error regardless of outcome.
        let _ = service.remove_all_images(owner).await;
    }

    #[tokio::test]
    async fn test_delete_image_none_is_noop() {
        let storage = test_storage();
        let repo = Arc::new(MockImageRecordStore::default());
        let service = AssetService::new(storage, repo);

        assert!(!service.delete_image(None).await);
        assert!(!service.delete_image(Some("")).await);
    }
}
