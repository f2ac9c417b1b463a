//! Asset lifecycle error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors from asset lifecycle operations.
#[derive(Debug, Error)]
pub enum AssetError {
    /// More files than the per-request cap allows.
    #[error("{count} files exceed the per-request limit of {max}")]
    TooManyFiles {
        /// Number of files in the request.
        count: usize,
        /// Per-request cap.
        max: usize,
    },

    /// No files were provided.
    #[error("no files provided")]
    NoFiles,

    /// The entity kind does not carry a photo list.
    #[error("entity does not support additional photos")]
    PhotosNotSupported,

    /// Underlying storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Record store failure.
    #[error("record store error: {0}")]
    Record(String),

    /// Entity not found in the record store.
    #[error("entity not found")]
    EntityNotFound,
}
