//! Repository abstractions for data access.

mod images;
mod pet;
mod report;
mod triggers;
mod user;

pub use images::ImageStore;
pub use pet::{NewPet, PetFilter, PetRepository, PetUpdate};
pub use report::{NewReport, ReportRepository};
pub use triggers::TriggerStore;
pub use user::{NewUser, UserRepository, UserUpdate};
