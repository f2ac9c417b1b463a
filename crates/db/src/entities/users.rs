//! `SeaORM` Entity for the users table.

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AuthProvider;

/// Postal address stored as a JSON value with explicit defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Street line.
    #[serde(default)]
    pub street: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// State or province.
    #[serde(default)]
    pub state: Option<String>,
    /// Postal code.
    #[serde(default)]
    pub zip_code: Option<String>,
    /// Country.
    #[serde(default)]
    pub country: Option<String>,
}

/// Notification preferences stored as a JSON value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    /// Whether the user receives notifications at all.
    #[serde(default = "default_true")]
    pub notifications: bool,
    /// Whether the user shares their location in reports.
    #[serde(default)]
    pub location_sharing: bool,
}

fn default_true() -> bool {
    true
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            notifications: true,
            location_sharing: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: Option<String>,
    #[sea_orm(unique)]
    pub phone: Option<String>,
    /// Argon2id PHC string; absent for federated accounts. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub auth_provider: AuthProvider,
    #[sea_orm(unique)]
    pub provider_uid: Option<String>,
    pub profile_image: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub address: Option<Address>,
    #[sea_orm(column_type = "JsonBinary")]
    pub notifications: NotificationPreferences,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_email_verified: bool,
    pub last_login_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pets::Entity")]
    Pets,
    #[sea_orm(has_many = "super::reports::Entity")]
    Reports,
}

impl Related<super::pets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pets.def()
    }
}

impl Related<super::reports::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_preferences_defaults() {
        let prefs = NotificationPreferences::default();
        assert!(prefs.notifications);
        assert!(!prefs.location_sharing);
    }

    #[test]
    fn test_notification_preferences_partial_json() {
        // Missing fields fall back to defaults instead of failing.
        let prefs: NotificationPreferences =
            serde_json::from_str(r#"{"locationSharing": true}"#).unwrap();
        assert!(prefs.notifications);
        assert!(prefs.location_sharing);
    }

    #[test]
    fn test_address_partial_json() {
        let address: Address =
            serde_json::from_str(r#"{"city": "New York", "zipCode": "10001"}"#).unwrap();
        assert_eq!(address.city.as_deref(), Some("New York"));
        assert_eq!(address.zip_code.as_deref(), Some("10001"));
        assert!(address.street.is_none());
    }
}
