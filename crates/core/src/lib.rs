//! Core business logic for PetTrack.
//!
//! This crate holds everything that is not HTTP or persistence:
//! - `storage`: object store client over Apache OpenDAL
//! - `asset`: the image-asset lifecycle coordinator
//! - `auth`: password hashing
//! - `identity`: narrow identity-provider admin client
//! - `triggers`: background event handlers (account lifecycle, storage events)
//!
//! Persistence is reached only through traits (`asset::ImageRecordStore`,
//! `triggers::UserDirectory`) implemented by the db crate.

pub mod asset;
pub mod auth;
pub mod identity;
pub mod storage;
pub mod triggers;
