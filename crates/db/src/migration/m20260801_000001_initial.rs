//! Initial database migration.
//!
//! Creates the enum types, the users/pets/reports tables, and their indexes.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(PETS_SQL).await?;
        db.execute_unprepared(REPORTS_SQL).await?;
        db.execute_unprepared(INDEXES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE auth_provider AS ENUM ('local', 'google');

CREATE TYPE pet_type AS ENUM (
    'Dog',
    'Cat',
    'Rabbit',
    'Hamster',
    'Guinea Pig',
    'Bird',
    'Other'
);

CREATE TYPE pet_gender AS ENUM ('Male', 'Female');

CREATE TYPE pet_color AS ENUM (
    'Black',
    'White',
    'Brown',
    'Golden',
    'Gray',
    'Orange',
    'Cream',
    'Multi-colored',
    'Other'
);

CREATE TYPE report_type AS ENUM ('lost', 'found', 'sighting');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    email VARCHAR(255) UNIQUE,
    phone VARCHAR(15) UNIQUE,
    password_hash TEXT,
    auth_provider auth_provider NOT NULL DEFAULT 'local',
    provider_uid VARCHAR(128) UNIQUE,
    profile_image TEXT,
    address JSONB,
    notifications JSONB NOT NULL DEFAULT '{}'::jsonb,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    is_verified BOOLEAN NOT NULL DEFAULT FALSE,
    is_email_verified BOOLEAN NOT NULL DEFAULT FALSE,
    last_login_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const PETS_SQL: &str = r"
CREATE TABLE pets (
    id UUID PRIMARY KEY,
    pet_name VARCHAR(50) NOT NULL,
    pet_type pet_type NOT NULL,
    breed VARCHAR(100) NOT NULL,
    gender pet_gender NOT NULL,
    color pet_color NOT NULL,
    home_location VARCHAR(200) NOT NULL,
    profile_image TEXT,
    additional_photos JSONB NOT NULL DEFAULT '[]'::jsonb,
    owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    is_lost BOOLEAN NOT NULL DEFAULT FALSE,
    is_found BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const REPORTS_SQL: &str = r"
CREATE TABLE reports (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    pet_id UUID REFERENCES pets(id) ON DELETE SET NULL,
    report_type report_type NOT NULL,
    message TEXT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const INDEXES_SQL: &str = r"
CREATE INDEX idx_pets_owner_active ON pets (owner_id, is_active);
CREATE INDEX idx_pets_type_breed ON pets (pet_type, breed);
CREATE INDEX idx_pets_lost_found ON pets (is_lost, is_found);
CREATE INDEX idx_reports_user ON reports (user_id);
CREATE INDEX idx_users_active_created ON users (is_active, created_at DESC);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS reports;
DROP TABLE IF EXISTS pets;
DROP TABLE IF EXISTS users;
DROP TYPE IF EXISTS report_type;
DROP TYPE IF EXISTS pet_color;
DROP TYPE IF EXISTS pet_gender;
DROP TYPE IF EXISTS pet_type;
DROP TYPE IF EXISTS auth_provider;
";
