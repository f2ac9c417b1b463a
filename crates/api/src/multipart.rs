//! Multipart form collection for image-upload endpoints.

use std::collections::HashMap;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;

use pettrack_core::asset::UploadedImage;

/// A fully-read multipart form: text fields plus uploaded image parts.
///
/// Parts are buffered in memory; the size cap is enforced later by the
/// storage validation step before any network call.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub(crate) fields: HashMap<String, String>,
    pub(crate) files: HashMap<String, Vec<UploadedImage>>,
}

impl MultipartForm {
    /// Reads every part of the multipart stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is malformed or a part cannot be read.
    pub async fn collect(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(ToString::to_string) else {
                continue;
            };

            if let Some(filename) = field.file_name().map(ToString::to_string) {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;
                form.files.entry(name).or_default().push(UploadedImage {
                    filename,
                    content_type,
                    bytes,
                });
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// A text field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// The first uploaded file under the given part name.
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&UploadedImage> {
        self.files.get(name).and_then(|files| files.first())
    }

    /// All uploaded files under the given part name.
    #[must_use]
    pub fn files(&self, name: &str) -> &[UploadedImage] {
        self.files.get(name).map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn form_with(fields: &[(&str, &str)], files: &[(&str, &str)]) -> MultipartForm {
        let mut form = MultipartForm::default();
        for (name, value) in fields {
            form.fields.insert((*name).to_string(), (*value).to_string());
        }
        for (name, filename) in files {
            form.files
                .entry((*name).to_string())
                .or_default()
                .push(UploadedImage {
                    filename: (*filename).to_string(),
                    content_type: "image/png".to_string(),
                    bytes: Bytes::from_static(b"png"),
                });
        }
        form
    }

    #[test]
    fn test_field_lookup() {
        let form = form_with(&[("petName", "Buddy")], &[]);
        assert_eq!(form.field("petName"), Some("Buddy"));
        assert_eq!(form.field("missing"), None);
    }

    #[test]
    fn test_file_lookup() {
        let form = form_with(&[], &[("photos", "a.png"), ("photos", "b.png")]);
        assert_eq!(form.file("photos").unwrap().filename, "a.png");
        assert_eq!(form.files("photos").len(), 2);
        assert!(form.files("profileImage").is_empty());
        assert!(form.file("profileImage").is_none());
    }
}
