//! Storage service implementation using Apache OpenDAL.

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Storage service for uploaded images.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

/// File extensions accepted when the reported MIME type is not conclusive.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::Gcs { bucket, credential } => {
                let mut builder = services::Gcs::default().bucket(bucket);
                if let Some(credential) = credential {
                    builder = builder.credential(credential);
                }

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
        }
    }

    /// Validate an image upload against config constraints.
    ///
    /// Runs entirely in memory: violations are rejected before any network
    /// call is made.
    ///
    /// # Errors
    ///
    /// Returns an error if the size exceeds the limit or the file is not an
    /// accepted image format (by MIME type or file extension).
    pub fn validate_image(
        &self,
        content_type: &str,
        filename: &str,
        size: u64,
    ) -> Result<(), StorageError> {
        if size > self.config.max_upload_size {
            return Err(StorageError::file_too_large(
                size,
                self.config.max_upload_size,
            ));
        }

        if self.config.is_mime_type_allowed(content_type) || has_image_extension(filename) {
            Ok(())
        } else {
            Err(StorageError::not_an_image(filename, content_type))
        }
    }

    /// Generate a storage key for an uploaded image.
    ///
    /// Format: `{folder}/{unix_millis}-{random}-{sanitized_filename}`
    #[must_use]
    pub fn generate_object_key(folder: &str, original_name: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let nonce = rand::random::<u32>();
        format!(
            "{folder}/{millis}-{nonce}-{}",
            sanitize_filename(original_name)
        )
    }

    /// Upload an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails. No record may reference `key`
    /// until this call has returned success.
    pub async fn upload(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.operator
            .write_with(key, bytes)
            .content_type(content_type)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    /// Public URL for an object key.
    ///
    /// Format: `https://{public_host}/{bucket}/{key}`
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}/{}/{key}",
            self.config.public_host,
            self.config.provider.bucket()
        )
    }

    /// Derive the storage key from a public URL.
    ///
    /// Takes the last two path segments (`folder/filename`), mirroring the
    /// key layout produced by [`Self::generate_object_key`].
    ///
    /// # Errors
    ///
    /// Returns an error if the URL has fewer than two non-empty segments.
    pub fn key_from_url(url: &str) -> Result<String, StorageError> {
        let segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < 2 {
            return Err(StorageError::InvalidUrl(url.to_string()));
        }
        Ok(segments[segments.len() - 2..].join("/"))
    }

    /// Delete an object from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Check if an object exists in storage.
    pub async fn exists(&self, key: &str) -> bool {
        match self.operator.stat(key).await {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(_) => false,
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the bucket/container name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.config.provider.bucket()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

/// Check a filename for an accepted image extension.
fn has_image_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Sanitize filename for use in a storage key.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_service() -> StorageService {
        let config = StorageConfig::new(StorageProvider::local_fs("./test"));
        StorageService::from_config(config).expect("should create service")
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("buddy.jpg"), "buddy.jpg");
        assert_eq!(sanitize_filename("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_filename("test@#$%.gif"), "test____.gif");
    }

    #[test]
    fn test_has_image_extension() {
        assert!(has_image_extension("photo.jpg"));
        assert!(has_image_extension("photo.JPEG"));
        assert!(has_image_extension("photo.webp"));
        assert!(!has_image_extension("document.pdf"));
        assert!(!has_image_extension("noextension"));
    }

    #[test]
    fn test_generate_object_key_shape() {
        let key = StorageService::generate_object_key("pets", "buddy.jpg");
        assert!(key.starts_with("pets/"));
        assert!(key.ends_with("-buddy.jpg"));
        // folder + single filename segment
        assert_eq!(key.split('/').count(), 2);
    }

    #[test]
    fn test_validate_image_size() {
        let config =
            StorageConfig::new(StorageProvider::local_fs("./test")).with_max_upload_size(1024);
        let service = StorageService::from_config(config).expect("should create service");

        assert!(service.validate_image("image/png", "a.png", 512).is_ok());

        let err = service
            .validate_image("image/png", "a.png", 2048)
            .unwrap_err();
        assert!(matches!(err, StorageError::FileTooLarge { .. }));
    }

    #[test]
    fn test_validate_image_type() {
        let service = local_service();

        assert!(service.validate_image("image/jpeg", "a.jpg", 100).is_ok());
        // Extension rescues an unknown MIME type
        assert!(
            service
                .validate_image("application/octet-stream", "a.png", 100)
                .is_ok()
        );

        let err = service
            .validate_image("application/pdf", "doc.pdf", 100)
            .unwrap_err();
        assert!(matches!(err, StorageError::NotAnImage { .. }));
    }

    #[test]
    fn test_public_url() {
        let config = StorageConfig::new(StorageProvider::gcs("pettrack-images", None));
        let service = StorageService::from_config(config).expect("should create service");

        assert_eq!(
            service.public_url("pets/1-2-buddy.jpg"),
            "https://storage.googleapis.com/pettrack-images/pets/1-2-buddy.jpg"
        );
    }

    #[test]
    fn test_key_from_url() {
        let key = StorageService::key_from_url(
            "https://storage.googleapis.com/pettrack-images/pets/1712-99-buddy.jpg",
        )
        .unwrap();
        assert_eq!(key, "pets/1712-99-buddy.jpg");
    }

    #[test]
    fn test_key_from_url_too_short() {
        let err = StorageService::key_from_url("https://").unwrap_err();
        assert!(matches!(err, StorageError::InvalidUrl(_)));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // Property: sanitized filenames only contain safe characters.
    proptest! {
        #[test]
        fn prop_sanitized_filename_safe_chars(filename in ".*") {
            let sanitized = sanitize_filename(&filename);

            for c in sanitized.chars() {
                let is_safe = c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_';
                prop_assert!(is_safe, "Unexpected character in sanitized filename: {}", c);
            }
        }
    }

    // Property: public URL and key derivation round-trip for generated keys.
    proptest! {
        #[test]
        fn prop_url_key_roundtrip(
            folder in "[a-z]{1,12}",
            filename in "[a-zA-Z0-9_-]{1,40}\\.[a-z]{3,4}",
        ) {
            let config = StorageConfig::new(StorageProvider::gcs("pettrack-images", None));
            let service = StorageService::from_config(config).expect("should create service");

            let key = StorageService::generate_object_key(&folder, &filename);
            let url = service.public_url(&key);
            let derived = StorageService::key_from_url(&url).expect("derivable key");

            prop_assert_eq!(derived, key);
        }
    }

    // Property: size validation accepts exactly the sizes within the limit.
    proptest! {
        #[test]
        fn prop_size_validation(
            max_size in 1024u64..10_000_000,
            file_size in 0u64..20_000_000,
        ) {
            let config = StorageConfig::new(StorageProvider::local_fs("./test"))
                .with_max_upload_size(max_size);
            let service = StorageService::from_config(config)
                .expect("should create service");

            let result = service.validate_image("image/png", "a.png", file_size);

            if file_size <= max_size {
                prop_assert!(result.is_ok(), "Expected Ok for valid file size");
            } else {
                let is_too_large = matches!(result, Err(StorageError::FileTooLarge { .. }));
                prop_assert!(is_too_large, "Expected FileTooLarge error");
            }
        }
    }

    // Property: MIME validation matches the configured allow-list when the
    // extension gives no rescue.
    proptest! {
        #[test]
        fn prop_mime_type_validation(mime_type in "[a-z]+/[a-z0-9-]+") {
            let config = StorageConfig::new(StorageProvider::local_fs("./test"));
            let service = StorageService::from_config(config.clone())
                .expect("should create service");

            let result = service.validate_image(&mime_type, "upload.bin", 1024);
            let is_allowed = config.is_mime_type_allowed(&mime_type);

            if is_allowed {
                prop_assert!(result.is_ok(), "Expected Ok for allowed MIME type");
            } else {
                let rejected = matches!(result, Err(StorageError::NotAnImage { .. }));
                prop_assert!(rejected, "Expected NotAnImage error");
            }
        }
    }
}
