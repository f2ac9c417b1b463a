//! Trigger error types.

use thiserror::Error;

use crate::identity::IdentityError;

/// Errors from trigger handlers.
#[derive(Debug, Error)]
pub enum TriggerError {
    /// Record store failure.
    #[error("record store error: {0}")]
    Record(String),

    /// The referenced user does not exist.
    #[error("user not found")]
    UserNotFound,

    /// Identity provider failure.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}
