//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for users, pets, and event webhooks
//! - Multipart form extraction for image uploads
//! - Request validation and the JSON `success`-envelope response shape

pub mod multipart;
pub mod routes;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use pettrack_core::asset::AssetService;
use pettrack_core::identity::IdentityClient;
use pettrack_core::storage::StorageService;
use pettrack_core::triggers::TriggerService;
use pettrack_db::{ImageStore, TriggerStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Object storage service.
    pub storage: Arc<StorageService>,
    /// Identity provider client.
    pub identity: Arc<IdentityClient>,
    /// Per-request cap on additional-photo uploads.
    pub max_photos_per_request: usize,
}

impl AppState {
    /// Asset lifecycle coordinator over this state's storage and database.
    #[must_use]
    pub fn assets(&self) -> AssetService<ImageStore> {
        AssetService::new(
            self.storage.clone(),
            Arc::new(ImageStore::new((*self.db).clone())),
        )
    }

    /// Trigger service over this state's database, identity client, and
    /// storage.
    #[must_use]
    pub fn triggers(&self) -> TriggerService<TriggerStore, IdentityClient> {
        TriggerService::new(
            Arc::new(TriggerStore::new((*self.db).clone())),
            self.identity.clone(),
            self.storage.clone(),
        )
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    // Room for a full photo batch plus form fields; per-file size is
    // enforced again by storage validation.
    let body_limit = usize::try_from(state.storage.config().max_upload_size)
        .unwrap_or(usize::MAX)
        .saturating_mul(state.max_photos_per_request + 1);

    Router::new()
        .merge(routes::health::routes())
        .nest("/api/users", routes::users::routes())
        .nest("/api/pets", routes::pets::routes())
        .nest("/api/events", routes::events::routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
