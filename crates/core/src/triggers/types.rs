//! Trigger event and result types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event emitted by the auth provider when a new account is created.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthAccountCreated {
    /// Provider-assigned account uid.
    pub uid: String,
    /// Account email, if any.
    #[serde(default)]
    pub email: Option<String>,
    /// Account phone number, if any.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Display name, if any.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Provider-side photo URL, if any.
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Profile record to create for a fresh auth account.
#[derive(Debug, Clone)]
pub struct NewProfile {
    /// Provider-assigned account uid.
    pub provider_uid: String,
    /// Account email.
    pub email: Option<String>,
    /// Account phone number.
    pub phone: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Provider-side photo URL.
    pub profile_image: Option<String>,
}

/// Event emitted by the object store when an upload is finalized.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectFinalized {
    /// Object path within the bucket.
    pub name: String,
    /// Reported content type.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Bucket the object landed in.
    pub bucket: String,
}

/// What a finalize event did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ObjectFinalizedOutcome {
    /// A user's profile-image URL was updated.
    Updated {
        /// The affected user.
        user_id: Uuid,
        /// The URL now stored on the record.
        url: String,
    },
    /// The object path did not match any convention we track.
    Ignored,
}

/// User row removed during an account-deletion cascade.
#[derive(Debug, Clone)]
pub struct DeletedUser {
    /// Provider uid of the auth account, if the user had one.
    pub provider_uid: Option<String>,
    /// Profile-image URL held by the record, if any.
    pub profile_image: Option<String>,
}

/// Summary of a completed account-deletion cascade.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDeletion {
    /// Pets removed.
    pub pets_deleted: u64,
    /// Reports removed.
    pub reports_deleted: u64,
    /// Whether the auth account was removed at the provider.
    pub auth_account_deleted: bool,
}
