//! Object storage for uploaded images using Apache OpenDAL.
//!
//! Vendor-agnostic object storage with support for:
//! - Google Cloud Storage
//! - S3-compatible: Cloudflare R2, Supabase Storage, AWS S3
//! - Local filesystem (development only)
//!
//! Objects are publicly readable through bucket-level policy; this module
//! only constructs the public URLs and never issues per-object ACL calls.

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::StorageService;
