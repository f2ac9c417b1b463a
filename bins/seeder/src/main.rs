//! Database seeder for PetTrack development and testing.
//!
//! Seeds sample users, pets, and a report for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use pettrack_core::auth::hash_password;
use pettrack_db::entities::sea_orm_active_enums::{
    AuthProvider, Gender, PetColor, PetType, ReportType,
};
use pettrack_db::entities::users::NotificationPreferences;
use pettrack_db::entities::{pets, reports, users};

/// Seed user IDs (consistent for all runs)
const USER_IDS: [&str; 3] = [
    "00000000-0000-0000-0000-000000000001",
    "00000000-0000-0000-0000-000000000002",
    "00000000-0000-0000-0000-000000000003",
];

struct SeedUser {
    id: &'static str,
    name: &'static str,
    email: &'static str,
    phone: &'static str,
}

struct SeedPet {
    owner: usize,
    pet_name: &'static str,
    pet_type: PetType,
    breed: &'static str,
    gender: Gender,
    color: PetColor,
    home_location: &'static str,
    is_lost: bool,
}

const SEED_USERS: [SeedUser; 3] = [
    SeedUser {
        id: USER_IDS[0],
        name: "John Doe",
        email: "john@example.com",
        phone: "1234567890",
    },
    SeedUser {
        id: USER_IDS[1],
        name: "Jane Smith",
        email: "jane@example.com",
        phone: "0987654321",
    },
    SeedUser {
        id: USER_IDS[2],
        name: "Mike Johnson",
        email: "mike@example.com",
        phone: "5551234567",
    },
];

const SEED_PETS: [SeedPet; 4] = [
    SeedPet {
        owner: 0,
        pet_name: "Buddy",
        pet_type: PetType::Dog,
        breed: "Golden Retriever",
        gender: Gender::Male,
        color: PetColor::Golden,
        home_location: "123 Main St, New York, NY 10001",
        is_lost: false,
    },
    SeedPet {
        owner: 1,
        pet_name: "Whiskers",
        pet_type: PetType::Cat,
        breed: "Persian",
        gender: Gender::Female,
        color: PetColor::White,
        home_location: "456 Oak Ave, Los Angeles, CA 90210",
        is_lost: false,
    },
    SeedPet {
        owner: 2,
        pet_name: "Max",
        pet_type: PetType::Dog,
        breed: "German Shepherd",
        gender: Gender::Male,
        color: PetColor::Black,
        home_location: "789 Pine Rd, Chicago, IL 60601",
        is_lost: true,
    },
    SeedPet {
        owner: 1,
        pet_name: "Bunny",
        pet_type: PetType::Rabbit,
        breed: "Holland Lop",
        gender: Gender::Female,
        color: PetColor::Brown,
        home_location: "456 Oak Ave, Los Angeles, CA 90210",
        is_lost: false,
    },
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = pettrack_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding users...");
    seed_users(&db).await;

    println!("Seeding pets...");
    seed_pets(&db).await;

    println!("Seeding a lost-pet report...");
    seed_report(&db).await;

    println!("Seeding complete!");
}

fn user_id(index: usize) -> Uuid {
    Uuid::parse_str(USER_IDS[index]).expect("valid seed uuid")
}

/// Seeds sample users with the shared development password.
async fn seed_users(db: &DatabaseConnection) {
    let password_hash = hash_password("password123").expect("should hash seed password");

    for seed in &SEED_USERS {
        let id = Uuid::parse_str(seed.id).expect("valid seed uuid");

        if users::Entity::find_by_id(id)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  User {} already exists, skipping...", seed.email);
            continue;
        }

        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(id),
            name: Set(seed.name.to_string()),
            email: Set(Some(seed.email.to_string())),
            phone: Set(Some(seed.phone.to_string())),
            password_hash: Set(Some(password_hash.clone())),
            auth_provider: Set(AuthProvider::Local),
            provider_uid: Set(None),
            profile_image: Set(None),
            address: Set(None),
            notifications: Set(NotificationPreferences::default()),
            is_active: Set(true),
            is_verified: Set(true),
            is_email_verified: Set(false),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        if let Err(e) = user.insert(db).await {
            eprintln!("Failed to insert user {}: {e}", seed.email);
        } else {
            println!("  Created user: {}", seed.email);
        }
    }
}

/// Seeds sample pets for the seed users.
async fn seed_pets(db: &DatabaseConnection) {
    for seed in &SEED_PETS {
        let now = Utc::now().into();
        let pet = pets::ActiveModel {
            id: Set(Uuid::new_v4()),
            pet_name: Set(seed.pet_name.to_string()),
            pet_type: Set(seed.pet_type),
            breed: Set(seed.breed.to_string()),
            gender: Set(seed.gender),
            color: Set(seed.color),
            home_location: Set(seed.home_location.to_string()),
            profile_image: Set(None),
            additional_photos: Set(pets::PhotoList::default()),
            owner_id: Set(user_id(seed.owner)),
            is_active: Set(true),
            is_lost: Set(seed.is_lost),
            is_found: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        if let Err(e) = pet.insert(db).await {
            // Ignore duplicate key errors on re-runs
            if !e.to_string().contains("duplicate key") {
                eprintln!("Failed to insert pet {}: {e}", seed.pet_name);
            }
        } else {
            println!("  Created pet: {}", seed.pet_name);
        }
    }
}

/// Seeds one lost-pet report so the cascade path has data to exercise.
async fn seed_report(db: &DatabaseConnection) {
    let report = reports::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id(2)),
        pet_id: Set(None),
        report_type: Set(ReportType::Lost),
        message: Set("Max slipped his leash near Pine Rd; answers to his name.".to_string()),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    };

    if let Err(e) = report.insert(db).await {
        eprintln!("Failed to insert report: {e}");
    } else {
        println!("  Created report for Max");
    }
}
