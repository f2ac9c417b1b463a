//! Event webhook routes for the background triggers.
//!
//! The auth provider and the object store invoke these endpoints when
//! accounts are created and uploads are finalized. Both handlers are
//! best-effort: failures are logged and acknowledged with 200 so the
//! platform does not retry into the same error forever.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use pettrack_core::triggers::{AuthAccountCreated, ObjectFinalized, ObjectFinalizedOutcome};

/// Creates the event webhook routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/account-created", post(account_created))
        .route("/storage/object-finalized", post(object_finalized))
}

/// POST /api/events/auth/account-created
/// Create a profile record for a freshly created auth account.
async fn account_created(
    State(state): State<AppState>,
    Json(event): Json<AuthAccountCreated>,
) -> impl IntoResponse {
    let uid = event.uid.clone();
    match state.triggers().handle_account_created(event).await {
        Ok(()) => info!(%uid, "Account-created event handled"),
        // The auth account exists regardless; nothing to propagate.
        Err(e) => error!(%uid, error = %e, "Account-created event failed"),
    }

    (StatusCode::OK, Json(json!({ "success": true })))
}

/// POST /api/events/storage/object-finalized
/// Reconcile an out-of-band profile-photo upload with the user record.
async fn object_finalized(
    State(state): State<AppState>,
    Json(event): Json<ObjectFinalized>,
) -> impl IntoResponse {
    let name = event.name.clone();
    match state.triggers().handle_object_finalized(event).await {
        Ok(outcome @ ObjectFinalizedOutcome::Updated { .. }) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": outcome })),
        ),
        Ok(ObjectFinalizedOutcome::Ignored) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": { "outcome": "ignored" } })),
        ),
        Err(e) => {
            error!(name, error = %e, "Object-finalized event failed");
            (StatusCode::OK, Json(json!({ "success": true })))
        }
    }
}
