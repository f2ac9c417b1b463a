//! PetTrack API Server
//!
//! Main entry point for the PetTrack backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pettrack_api::{AppState, create_router};
use pettrack_core::identity::IdentityClient;
use pettrack_core::storage::{StorageConfig, StorageProvider, StorageService};
use pettrack_db::connect;
use pettrack_shared::AppConfig;
use pettrack_shared::config::StorageSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pettrack=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Create storage service
    let storage_config = storage_config(&config.storage)?;
    let storage = StorageService::from_config(storage_config)?;
    info!(
        provider = storage.provider_name(),
        bucket = storage.bucket(),
        "Storage service configured"
    );

    // Create identity client
    let identity = match &config.identity {
        Some(settings) => {
            info!(base_url = %settings.base_url, "Identity provider configured");
            IdentityClient::http(&settings.base_url, &settings.api_key)?
        }
        None => {
            info!("No identity provider configured; auth-account deletion disabled");
            IdentityClient::Disabled
        }
    };

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        storage: Arc::new(storage),
        identity: Arc::new(identity),
        max_photos_per_request: config.storage.max_photos_per_request,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the storage service configuration from app settings.
fn storage_config(settings: &StorageSettings) -> anyhow::Result<StorageConfig> {
    let provider = match settings.backend.as_str() {
        "gcs" => StorageProvider::gcs(&settings.bucket, settings.credential.clone()),
        "s3" => StorageProvider::s3(
            settings
                .endpoint
                .clone()
                .ok_or_else(|| anyhow::anyhow!("storage.endpoint is required for s3"))?,
            &settings.bucket,
            settings
                .access_key_id
                .clone()
                .ok_or_else(|| anyhow::anyhow!("storage.access_key_id is required for s3"))?,
            settings
                .secret_access_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("storage.secret_access_key is required for s3"))?,
            settings.region.clone().unwrap_or_else(|| "auto".to_string()),
        ),
        "local_fs" | "local" => StorageProvider::local_fs(&settings.bucket),
        other => anyhow::bail!("unknown storage backend: {other}"),
    };

    Ok(StorageConfig::new(provider)
        .with_public_host(&settings.public_host)
        .with_max_upload_size(settings.max_upload_size))
}
