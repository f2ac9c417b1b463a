//! Background trigger handlers.
//!
//! These run outside any client request, invoked by the external platform
//! on auth and storage events, and converge record state with external
//! state. Most handlers are best-effort: callers log failures and never
//! propagate them as fatal. Account deletion is the exception; it aborts on
//! record failures so the auth account is never removed ahead of its
//! dependent records.

mod error;
mod service;
mod types;

pub use error::TriggerError;
pub use service::{TriggerService, UserDirectory};
pub use types::{
    AccountDeletion, AuthAccountCreated, DeletedUser, NewProfile, ObjectFinalized,
    ObjectFinalizedOutcome,
};
