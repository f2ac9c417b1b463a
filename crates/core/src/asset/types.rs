//! Asset types.

use bytes::Bytes;
use uuid::Uuid;

/// An image received from a client, held in memory until uploaded.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Original filename as sent by the client.
    pub filename: String,
    /// Reported MIME type.
    pub content_type: String,
    /// Raw image bytes.
    pub bytes: Bytes,
}

impl UploadedImage {
    /// Size of the payload in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Reference to the entity that owns an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOwner {
    /// A user record.
    User(Uuid),
    /// A pet record.
    Pet(Uuid),
}

impl ImageOwner {
    /// The entity's record id.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        match self {
            Self::User(id) | Self::Pet(id) => *id,
        }
    }

    /// Storage folder conventionally used for this entity kind.
    #[must_use]
    pub const fn folder(&self) -> &'static str {
        match self {
            Self::User(_) => "users",
            Self::Pet(_) => "pets",
        }
    }
}
