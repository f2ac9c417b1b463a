//! Image-asset lifecycle coordination.
//!
//! Keeps an entity's persisted image URLs consistent with what actually
//! exists in the object store across create, update, append, and delete,
//! even though the object store and the record store fail independently
//! and no transaction spans them. The ordering rules are:
//!
//! 1. upload before reference: no record ever points at an object that was
//!    not fully uploaded;
//! 2. reference before cleanup: old objects are deleted only after the
//!    record points elsewhere;
//! 3. deletes are best-effort: an orphaned blob is an acceptable,
//!    recoverable cost, a dangling record reference is not.

mod error;
mod service;
mod types;

pub use error::AssetError;
pub use service::{AssetService, ImageRecordStore};
pub use types::{ImageOwner, UploadedImage};
