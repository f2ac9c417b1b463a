//! `SeaORM` entity definitions.

pub mod pets;
pub mod reports;
pub mod sea_orm_active_enums;
pub mod users;
