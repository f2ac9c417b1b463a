//! Trigger handler implementation.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::error::TriggerError;
use super::types::{
    AccountDeletion, AuthAccountCreated, DeletedUser, NewProfile, ObjectFinalized,
    ObjectFinalizedOutcome,
};
use crate::identity::IdentityProvider;
use crate::storage::StorageService;

/// Record-store view used by trigger handlers.
///
/// Implemented by the db crate.
pub trait UserDirectory: Send + Sync {
    /// Look up a user id by provider uid.
    fn find_user_id_by_provider_uid(
        &self,
        provider_uid: &str,
    ) -> impl std::future::Future<Output = Result<Option<Uuid>, TriggerError>> + Send;

    /// Create a profile record with default preferences.
    fn create_profile(
        &self,
        profile: NewProfile,
    ) -> impl std::future::Future<Output = Result<Uuid, TriggerError>> + Send;

    /// Overwrite a user's profile-image URL. Returns whether a live user row
    /// was updated.
    fn set_profile_image_url(
        &self,
        user_id: Uuid,
        url: String,
    ) -> impl std::future::Future<Output = Result<bool, TriggerError>> + Send;

    /// Hard-delete all pets owned by the user. Returns the count removed.
    fn delete_pets_by_owner(
        &self,
        user_id: Uuid,
    ) -> impl std::future::Future<Output = Result<u64, TriggerError>> + Send;

    /// Hard-delete all reports referencing the user. Returns the count removed.
    fn delete_reports_by_user(
        &self,
        user_id: Uuid,
    ) -> impl std::future::Future<Output = Result<u64, TriggerError>> + Send;

    /// Hard-delete the user row. Returns `None` if no such user existed.
    fn delete_user(
        &self,
        user_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<DeletedUser>, TriggerError>> + Send;
}

/// Handles auth and storage events outside the request path.
pub struct TriggerService<D: UserDirectory, I: IdentityProvider> {
    directory: Arc<D>,
    identity: Arc<I>,
    storage: Arc<StorageService>,
}

impl<D: UserDirectory, I: IdentityProvider> TriggerService<D, I> {
    /// Create a new trigger service.
    #[must_use]
    pub fn new(directory: Arc<D>, identity: Arc<I>, storage: Arc<StorageService>) -> Self {
        Self {
            directory,
            identity,
            storage,
        }
    }

    /// Auth-account-created: create the corresponding profile record.
    ///
    /// Idempotent: an existing profile for the uid is left alone. The caller
    /// treats failure as log-only; the auth account exists regardless of
    /// what happens here.
    ///
    /// # Errors
    ///
    /// Returns an error if the record store fails.
    pub async fn handle_account_created(
        &self,
        event: AuthAccountCreated,
    ) -> Result<(), TriggerError> {
        if let Some(existing) = self
            .directory
            .find_user_id_by_provider_uid(&event.uid)
            .await?
        {
            info!(uid = %event.uid, user_id = %existing, "Profile already exists; skipping");
            return Ok(());
        }

        let user_id = self
            .directory
            .create_profile(NewProfile {
                provider_uid: event.uid.clone(),
                email: event.email,
                phone: event.phone_number,
                name: event.display_name,
                profile_image: event.photo_url,
            })
            .await?;

        info!(uid = %event.uid, user_id = %user_id, "Profile created for new auth account");
        Ok(())
    }

    /// Storage-finalize: reconcile out-of-band profile-photo uploads.
    ///
    /// Only objects under `users/{user_id}/profile/` are considered; the
    /// record field is last-write-wins between this path and the REST
    /// upload path. Any other path shape, non-image, or unknown user is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the record store fails.
    pub async fn handle_object_finalized(
        &self,
        event: ObjectFinalized,
    ) -> Result<ObjectFinalizedOutcome, TriggerError> {
        if !event
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"))
        {
            return Ok(ObjectFinalizedOutcome::Ignored);
        }

        let Some(user_id) = profile_photo_owner(&event.name) else {
            return Ok(ObjectFinalizedOutcome::Ignored);
        };

        let url = format!(
            "https://{}/{}/{}",
            self.storage.config().public_host,
            event.bucket,
            event.name
        );

        if self
            .directory
            .set_profile_image_url(user_id, url.clone())
            .await?
        {
            info!(%user_id, url, "Profile image synced from storage event");
            Ok(ObjectFinalizedOutcome::Updated { user_id, url })
        } else {
            warn!(%user_id, "Finalize event for unknown user; ignoring");
            Ok(ObjectFinalizedOutcome::Ignored)
        }
    }

    /// Explicit account deletion: cascade records, then the auth account.
    ///
    /// Pets and reports are deleted concurrently and awaited, then the user
    /// row, then the auth account. A crash mid-sequence can leave the auth
    /// account intact with no profile (recoverable by re-running), never
    /// the reverse. The stored profile image is cleaned up best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error if any record deletion fails (before the auth
    /// account is touched), if the user does not exist, or if the identity
    /// provider rejects the deletion.
    pub async fn delete_account(&self, user_id: Uuid) -> Result<AccountDeletion, TriggerError> {
        let (pets_deleted, reports_deleted) = futures::try_join!(
            self.directory.delete_pets_by_owner(user_id),
            self.directory.delete_reports_by_user(user_id),
        )?;

        let deleted = self
            .directory
            .delete_user(user_id)
            .await?
            .ok_or(TriggerError::UserNotFound)?;

        if let Some(url) = &deleted.profile_image {
            match StorageService::key_from_url(url) {
                Ok(key) => {
                    if let Err(e) = self.storage.delete(&key).await {
                        warn!(key, error = %e, "Profile image cleanup failed; leaving orphan");
                    }
                }
                Err(e) => warn!(url, error = %e, "Could not derive key for profile image"),
            }
        }

        let auth_account_deleted = match &deleted.provider_uid {
            Some(uid) => {
                self.identity.delete_account(uid).await?;
                true
            }
            None => false,
        };

        info!(
            %user_id,
            pets_deleted,
            reports_deleted,
            auth_account_deleted,
            "Account deletion cascade complete"
        );

        Ok(AccountDeletion {
            pets_deleted,
            reports_deleted,
            auth_account_deleted,
        })
    }
}

/// Extract the owning user id from a profile-photo object path.
///
/// Convention: `users/{user_id}/profile/...`.
fn profile_photo_owner(path: &str) -> Option<Uuid> {
    let mut segments = path.split('/');
    if segments.next() != Some("users") {
        return None;
    }
    let user_id = Uuid::parse_str(segments.next()?).ok()?;
    if segments.next() != Some("profile") {
        return None;
    }
    Some(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentityError;
    use crate::storage::{StorageConfig, StorageProvider};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct MockDirectory {
        profiles: Mutex<HashMap<String, Uuid>>,
        users: Mutex<HashMap<Uuid, DeletedUser>>,
        photo_urls: Mutex<HashMap<Uuid, String>>,
        fail_pet_delete: bool,
        records_deleted: AtomicBool,
    }

    impl UserDirectory for MockDirectory {
        async fn find_user_id_by_provider_uid(
            &self,
            provider_uid: &str,
        ) -> Result<Option<Uuid>, TriggerError> {
            Ok(self.profiles.lock().unwrap().get(provider_uid).copied())
        }

        async fn create_profile(&self, profile: NewProfile) -> Result<Uuid, TriggerError> {
            let id = Uuid::new_v4();
            self.profiles
                .lock()
                .unwrap()
                .insert(profile.provider_uid, id);
            Ok(id)
        }

        async fn set_profile_image_url(
            &self,
            user_id: Uuid,
            url: String,
        ) -> Result<bool, TriggerError> {
            if self.users.lock().unwrap().contains_key(&user_id) {
                self.photo_urls.lock().unwrap().insert(user_id, url);
                Ok(true)
            } else {
                Ok(false)
            }
        }

        async fn delete_pets_by_owner(&self, _user_id: Uuid) -> Result<u64, TriggerError> {
            if self.fail_pet_delete {
                return Err(TriggerError::Record("pets table unavailable".into()));
            }
            self.records_deleted.store(true, Ordering::SeqCst);
            Ok(2)
        }

        async fn delete_reports_by_user(&self, _user_id: Uuid) -> Result<u64, TriggerError> {
            Ok(1)
        }

        async fn delete_user(&self, user_id: Uuid) -> Result<Option<DeletedUser>, TriggerError> {
            Ok(self.users.lock().unwrap().remove(&user_id))
        }
    }

    /// Identity mock asserting that records were deleted before it is called.
    struct OrderedIdentity {
        directory: Arc<MockDirectory>,
        called: AtomicBool,
        reject: bool,
    }

    impl IdentityProvider for OrderedIdentity {
        async fn delete_account(&self, _provider_uid: &str) -> Result<(), IdentityError> {
            assert!(
                self.directory.records_deleted.load(Ordering::SeqCst),
                "auth account deleted before dependent records"
            );
            self.called.store(true, Ordering::SeqCst);
            if self.reject {
                return Err(IdentityError::Rejected {
                    status: 503,
                    message: "unavailable".into(),
                });
            }
            Ok(())
        }
    }

    fn test_storage() -> Arc<StorageService> {
        let root = std::env::temp_dir().join(format!("pettrack-trigger-test-{}", Uuid::new_v4()));
        let config = StorageConfig::new(StorageProvider::local_fs(root));
        Arc::new(StorageService::from_config(config).expect("should create storage"))
    }

    fn seeded_user(directory: &MockDirectory) -> Uuid {
        let user_id = Uuid::new_v4();
        directory.users.lock().unwrap().insert(
            user_id,
            DeletedUser {
                provider_uid: Some("uid-123".to_string()),
                profile_image: None,
            },
        );
        user_id
    }

    #[tokio::test]
    async fn test_account_created_creates_profile() {
        let directory = Arc::new(MockDirectory::default());
        let identity = Arc::new(OrderedIdentity {
            directory: directory.clone(),
            called: AtomicBool::new(false),
            reject: false,
        });
        let service = TriggerService::new(directory.clone(), identity, test_storage());

        let event = AuthAccountCreated {
            uid: "uid-777".to_string(),
            email: Some("a@x.com".to_string()),
            phone_number: None,
            display_name: Some("A".to_string()),
            photo_url: None,
        };

        service.handle_account_created(event).await.unwrap();
        assert!(directory.profiles.lock().unwrap().contains_key("uid-777"));
    }

    #[tokio::test]
    async fn test_account_created_is_idempotent() {
        let directory = Arc::new(MockDirectory::default());
        let existing = Uuid::new_v4();
        directory
            .profiles
            .lock()
            .unwrap()
            .insert("uid-777".to_string(), existing);
        let identity = Arc::new(OrderedIdentity {
            directory: directory.clone(),
            called: AtomicBool::new(false),
            reject: false,
        });
        let service = TriggerService::new(directory.clone(), identity, test_storage());

        let event = AuthAccountCreated {
            uid: "uid-777".to_string(),
            email: None,
            phone_number: None,
            display_name: None,
            photo_url: None,
        };

        service.handle_account_created(event).await.unwrap();
        assert_eq!(
            directory.profiles.lock().unwrap().get("uid-777"),
            Some(&existing)
        );
    }

    #[tokio::test]
    async fn test_delete_account_removes_auth_account_last() {
        let directory = Arc::new(MockDirectory::default());
        let user_id = seeded_user(&directory);
        let identity = Arc::new(OrderedIdentity {
            directory: directory.clone(),
            called: AtomicBool::new(false),
            reject: false,
        });
        let service = TriggerService::new(directory, identity.clone(), test_storage());

        let summary = service.delete_account(user_id).await.unwrap();

        assert!(identity.called.load(Ordering::SeqCst));
        assert_eq!(summary.pets_deleted, 2);
        assert_eq!(summary.reports_deleted, 1);
        assert!(summary.auth_account_deleted);
    }

    #[tokio::test]
    async fn test_delete_account_record_failure_keeps_auth_account() {
        let directory = Arc::new(MockDirectory {
            fail_pet_delete: true,
            ..MockDirectory::default()
        });
        let user_id = seeded_user(&directory);
        let identity = Arc::new(OrderedIdentity {
            directory: directory.clone(),
            called: AtomicBool::new(false),
            reject: false,
        });
        let service = TriggerService::new(directory, identity.clone(), test_storage());

        let result = service.delete_account(user_id).await;

        assert!(matches!(result, Err(TriggerError::Record(_))));
        assert!(!identity.called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_delete_account_unknown_user() {
        let directory = Arc::new(MockDirectory::default());
        let identity = Arc::new(OrderedIdentity {
            directory: directory.clone(),
            called: AtomicBool::new(false),
            reject: false,
        });
        let service = TriggerService::new(directory, identity, test_storage());

        let result = service.delete_account(Uuid::new_v4()).await;
        assert!(matches!(result, Err(TriggerError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_object_finalized_updates_profile_photo() {
        let directory = Arc::new(MockDirectory::default());
        let user_id = seeded_user(&directory);
        let identity = Arc::new(OrderedIdentity {
            directory: directory.clone(),
            called: AtomicBool::new(false),
            reject: false,
        });
        let service = TriggerService::new(directory.clone(), identity, test_storage());

        let event = ObjectFinalized {
            name: format!("users/{user_id}/profile/avatar.png"),
            content_type: Some("image/png".to_string()),
            bucket: "pettrack-images".to_string(),
        };

        let outcome = service.handle_object_finalized(event).await.unwrap();
        match outcome {
            ObjectFinalizedOutcome::Updated { user_id: id, url } => {
                assert_eq!(id, user_id);
                assert!(url.contains("pettrack-images"));
                assert_eq!(
                    directory.photo_urls.lock().unwrap().get(&user_id),
                    Some(&url)
                );
            }
            ObjectFinalizedOutcome::Ignored => panic!("expected update"),
        }
    }

    #[tokio::test]
    async fn test_object_finalized_ignores_other_paths() {
        let directory = Arc::new(MockDirectory::default());
        let identity = Arc::new(OrderedIdentity {
            directory: directory.clone(),
            called: AtomicBool::new(false),
            reject: false,
        });
        let service = TriggerService::new(directory, identity, test_storage());

        for name in [
            "pets/123/photo.png",
            "users/not-a-uuid/profile/a.png",
            "users/profile.png",
        ] {
            let event = ObjectFinalized {
                name: name.to_string(),
                content_type: Some("image/png".to_string()),
                bucket: "b".to_string(),
            };
            let outcome = service.handle_object_finalized(event).await.unwrap();
            assert_eq!(outcome, ObjectFinalizedOutcome::Ignored, "path {name}");
        }
    }

    #[tokio::test]
    async fn test_object_finalized_ignores_non_images() {
        let directory = Arc::new(MockDirectory::default());
        let user_id = seeded_user(&directory);
        let identity = Arc::new(OrderedIdentity {
            directory: directory.clone(),
            called: AtomicBool::new(false),
            reject: false,
        });
        let service = TriggerService::new(directory, identity, test_storage());

        let event = ObjectFinalized {
            name: format!("users/{user_id}/profile/notes.txt"),
            content_type: Some("text/plain".to_string()),
            bucket: "b".to_string(),
        };

        let outcome = service.handle_object_finalized(event).await.unwrap();
        assert_eq!(outcome, ObjectFinalizedOutcome::Ignored);
    }

    #[test]
    fn test_profile_photo_owner_parsing() {
        let id = Uuid::new_v4();
        assert_eq!(
            profile_photo_owner(&format!("users/{id}/profile/a.png")),
            Some(id)
        );
        assert_eq!(profile_photo_owner(&format!("users/{id}/other/a.png")), None);
        assert_eq!(profile_photo_owner("reports/x/profile/a.png"), None);
        assert_eq!(profile_photo_owner(""), None);
    }
}
