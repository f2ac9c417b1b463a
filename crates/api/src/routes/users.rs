//! User routes: registration, login, profile management, account deletion.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::multipart::MultipartForm;
use crate::routes::{
    asset_error_response, bad_request, internal_error, not_found, require_fields, unauthorized,
    validation_failed,
};
use crate::AppState;
use pettrack_core::asset::ImageOwner;
use pettrack_core::auth::{hash_password, verify_password};
use pettrack_core::triggers::TriggerError;
use pettrack_db::entities::sea_orm_active_enums::AuthProvider;
use pettrack_db::entities::users::{Address, NotificationPreferences};
use pettrack_db::repositories::{NewUser, UserRepository, UserUpdate};
use pettrack_shared::types::{PageRequest, PageResponse};

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/login-phone", post(login_phone))
        .route("/google-auth", post(google_auth))
        .route("/", get(list_users))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/{id}/verify", post(verify_user))
        .route("/{id}/notifications", post(update_notifications))
        .route("/{id}/delete-account", post(delete_account))
}

// ============================================================================
// Request Types
// ============================================================================

/// Validated registration fields.
#[derive(Debug, Validate)]
struct RegisterData {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    email: String,
    #[validate(length(
        min = 10,
        max = 15,
        message = "Phone number must be between 10 and 15 characters"
    ))]
    phone: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    password: String,
}

/// Validated profile-update fields (all optional).
#[derive(Debug, Default, Validate)]
struct UpdateData {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    name: Option<String>,
    #[validate(email(message = "Please enter a valid email address"))]
    email: Option<String>,
    #[validate(length(
        min = 10,
        max = 15,
        message = "Phone number must be between 10 and 15 characters"
    ))]
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhoneLoginRequest {
    phone: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleAuthRequest {
    provider_uid: Option<String>,
    email: Option<String>,
    name: Option<String>,
    profile_image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NotificationsRequest {
    notifications: NotificationPreferences,
}

// ============================================================================
// Helpers
// ============================================================================

fn user_repo(state: &AppState) -> UserRepository {
    UserRepository::new((*state.db).clone())
}

/// Parses the optional JSON-encoded `address` form field.
fn parse_address(raw: Option<&str>) -> Result<Option<Address>, Response> {
    match raw {
        None => Ok(None),
        Some(raw) => serde_json::from_str(raw)
            .map(Some)
            .map_err(|_| bad_request("Invalid address payload")),
    }
}

/// Parses the optional JSON-encoded `notifications` form field.
fn parse_notifications(raw: Option<&str>) -> Result<Option<NotificationPreferences>, Response> {
    match raw {
        None => Ok(None),
        Some(raw) => serde_json::from_str(raw)
            .map(Some)
            .map_err(|_| bad_request("Invalid notifications payload")),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/users/register - Register a new user (multipart).
async fn register(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match MultipartForm::collect(multipart).await {
        Ok(form) => form,
        Err(e) => return bad_request(&format!("Malformed multipart request: {e}")),
    };

    let [name, email, phone, password] =
        match require_fields(&form, ["name", "email", "phone", "password"]) {
            Ok(values) => values,
            Err(response) => return response,
        };

    let payload = RegisterData {
        name,
        email: email.to_lowercase(),
        phone,
        password,
    };
    if let Err(errors) = payload.validate() {
        return validation_failed(&errors);
    }

    let address = match parse_address(form.field("address")) {
        Ok(address) => address,
        Err(response) => return response,
    };

    let repo = user_repo(&state);

    match repo.email_or_phone_exists(&payload.email, &payload.phone).await {
        Ok(true) => {
            return bad_request("User with this email or phone number already exists");
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error checking uniqueness");
            return internal_error("Error registering user", &e);
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return internal_error("Error registering user", &e);
        }
    };

    // Upload before any record write; a failed upload leaves no trace in
    // the record store.
    let profile_image = match form.file("profileImage") {
        Some(file) => match state.assets().attach_image(file, "users").await {
            Ok(url) => Some(url),
            Err(e) => {
                error!(error = %e, "Profile image upload failed");
                return asset_error_response("Error uploading image", &e);
            }
        },
        None => None,
    };

    match repo
        .create(NewUser {
            name: payload.name,
            email: Some(payload.email),
            phone: Some(payload.phone),
            password_hash: Some(password_hash),
            auth_provider: AuthProvider::Local,
            provider_uid: None,
            profile_image,
            address,
            is_email_verified: false,
        })
        .await
    {
        Ok(user) => {
            info!(user_id = %user.id, "User registered");
            (
                StatusCode::CREATED,
                Json(json!({
                    "success": true,
                    "message": "User registered successfully",
                    "data": user,
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create user");
            internal_error("Error registering user", &e)
        }
    }
}

/// POST /api/users/login - Login with email and password.
async fn login(State(state): State<AppState>, Json(payload): Json<LoginRequest>) -> Response {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return bad_request("Please provide email and password");
    };

    let repo = user_repo(&state);
    let user = match repo.find_by_email(&email.to_lowercase()).await {
        Ok(Some(user)) => user,
        Ok(None) => return unauthorized("Invalid email or password"),
        Err(e) => {
            error!(error = %e, "Database error during login");
            return internal_error("Error logging in user", &e);
        }
    };

    finish_login(&repo, user, &password).await
}

/// POST /api/users/login-phone - Login with phone number and password.
async fn login_phone(
    State(state): State<AppState>,
    Json(payload): Json<PhoneLoginRequest>,
) -> Response {
    let (Some(phone), Some(password)) = (payload.phone, payload.password) else {
        return bad_request("Please provide phone number and password");
    };

    let repo = user_repo(&state);
    let user = match repo.find_by_phone(&phone).await {
        Ok(Some(user)) => user,
        Ok(None) => return unauthorized("Invalid phone number or password"),
        Err(e) => {
            error!(error = %e, "Database error during login");
            return internal_error("Error logging in user", &e);
        }
    };

    finish_login(&repo, user, &password).await
}

/// Shared tail of both login flows: check account state, verify the
/// password, record the login, return the profile.
async fn finish_login(
    repo: &UserRepository,
    user: pettrack_db::entities::users::Model,
    password: &str,
) -> Response {
    if !user.is_active {
        return unauthorized("This account has been disabled");
    }

    let Some(password_hash) = user.password_hash.as_deref() else {
        // Federated account with no local credential.
        return unauthorized("Invalid credentials");
    };

    match verify_password(password, password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt");
            return unauthorized("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error("Error logging in user", &e);
        }
    }

    if let Err(e) = repo.record_login(user.id).await {
        warn!(user_id = %user.id, error = %e, "Could not record login time");
    }

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Login successful",
            "data": user,
        })),
    )
        .into_response()
}

/// POST /api/users/google-auth - Upsert a federated account.
///
/// Resolution order: provider uid first, then email, then create.
async fn google_auth(
    State(state): State<AppState>,
    Json(payload): Json<GoogleAuthRequest>,
) -> Response {
    let (Some(provider_uid), Some(email)) = (payload.provider_uid, payload.email) else {
        return bad_request("Provider UID and email are required");
    };
    let email = email.to_lowercase();

    let repo = user_repo(&state);

    let user = match repo.find_by_provider_uid(&provider_uid).await {
        Ok(Some(user)) => {
            // Known account: refresh name/photo if the provider sent newer ones.
            let mut refreshed = user;
            if let Some(name) = payload.name.filter(|n| *n != refreshed.name) {
                match repo
                    .update(
                        refreshed.id,
                        UserUpdate {
                            name: Some(name),
                            ..UserUpdate::default()
                        },
                    )
                    .await
                {
                    Ok(Some(user)) => refreshed = user,
                    Ok(None) => {}
                    Err(e) => return internal_error("Error during Google authentication", &e),
                }
            }
            if let Some(image) = payload
                .profile_image
                .filter(|i| refreshed.profile_image.as_ref() != Some(i))
            {
                match repo.set_profile_image(refreshed.id, Some(image)).await {
                    Ok(Some(user)) => refreshed = user,
                    Ok(None) => {}
                    Err(e) => return internal_error("Error during Google authentication", &e),
                }
            }
            refreshed
        }
        Ok(None) => match repo.find_by_email(&email).await {
            Ok(Some(existing)) => {
                // Known email without a provider link: attach it.
                let linked = match repo.link_provider(existing.id, &provider_uid).await {
                    Ok(Some(user)) => user,
                    Ok(None) => existing,
                    Err(e) => return internal_error("Error during Google authentication", &e),
                };
                if linked.profile_image.is_none() {
                    if let Some(image) = payload.profile_image {
                        match repo.set_profile_image(linked.id, Some(image)).await {
                            Ok(Some(user)) => {
                                return google_auth_ok(user);
                            }
                            Ok(None) => {}
                            Err(e) => {
                                return internal_error("Error during Google authentication", &e);
                            }
                        }
                    }
                }
                linked
            }
            Ok(None) => {
                let created = repo
                    .create(NewUser {
                        name: payload.name.unwrap_or_else(|| "Google User".to_string()),
                        email: Some(email),
                        phone: None,
                        password_hash: None,
                        auth_provider: AuthProvider::Google,
                        provider_uid: Some(provider_uid),
                        profile_image: payload.profile_image,
                        address: None,
                        is_email_verified: true,
                    })
                    .await;
                match created {
                    Ok(user) => {
                        info!(user_id = %user.id, "Federated user created");
                        user
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to create federated user");
                        return internal_error("Error during Google authentication", &e);
                    }
                }
            }
            Err(e) => return internal_error("Error during Google authentication", &e),
        },
        Err(e) => return internal_error("Error during Google authentication", &e),
    };

    google_auth_ok(user)
}

fn google_auth_ok(user: pettrack_db::entities::users::Model) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Google authentication successful",
            "data": user,
        })),
    )
        .into_response()
}

/// GET /api/users - List active users with pagination.
async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Response {
    match user_repo(&state).list_active(&page).await {
        Ok((users, total)) => {
            let response = PageResponse::new(users, page.page, page.limit, total);
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "data": response.data,
                    "pagination": response.pagination,
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list users");
            internal_error("Error fetching users", &e)
        }
    }
}

/// GET /api/users/{id} - Fetch a user by id (soft-deleted included).
async fn get_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match user_repo(&state).find_by_id(id).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": user })),
        )
            .into_response(),
        Ok(None) => not_found("User not found"),
        Err(e) => {
            error!(error = %e, "Failed to fetch user");
            internal_error("Error fetching user", &e)
        }
    }
}

/// PUT /api/users/{id} - Update a profile (multipart, optional image).
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Response {
    let form = match MultipartForm::collect(multipart).await {
        Ok(form) => form,
        Err(e) => return bad_request(&format!("Malformed multipart request: {e}")),
    };

    let payload = UpdateData {
        name: form.field("name").map(str::to_string),
        email: form.field("email").map(str::to_lowercase),
        phone: form.field("phone").map(str::to_string),
    };
    if let Err(errors) = payload.validate() {
        return validation_failed(&errors);
    }

    let address = match parse_address(form.field("address")) {
        Ok(address) => address,
        Err(response) => return response,
    };
    let notifications = match parse_notifications(form.field("notifications")) {
        Ok(notifications) => notifications,
        Err(response) => return response,
    };

    let repo = user_repo(&state);
    match repo.find_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("User not found"),
        Err(e) => return internal_error("Error updating user profile", &e),
    }

    // Image first: a failed upload must abort before any record mutation.
    if let Some(file) = form.file("profileImage") {
        let owner = ImageOwner::User(id);
        if let Err(e) = state
            .assets()
            .replace_profile_image(owner, file, owner.folder())
            .await
        {
            error!(user_id = %id, error = %e, "Profile image replace failed");
            return asset_error_response("Error uploading image", &e);
        }
    }

    match repo
        .update(
            id,
            UserUpdate {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                address,
                notifications,
            },
        )
        .await
    {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "User profile updated successfully",
                "data": user,
            })),
        )
            .into_response(),
        Ok(None) => not_found("User not found"),
        Err(e) => {
            error!(error = %e, "Failed to update user");
            internal_error("Error updating user profile", &e)
        }
    }
}

/// DELETE /api/users/{id} - Soft-delete a user.
///
/// Stored images are removed best-effort before the record is deactivated;
/// a failed object delete never blocks the soft delete.
async fn delete_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = user_repo(&state);
    match repo.find_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("User not found"),
        Err(e) => return internal_error("Error deleting user", &e),
    }

    state.assets().remove_all_images(ImageOwner::User(id)).await;

    match repo.soft_delete(id).await {
        Ok(Some(_)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "User deleted successfully",
            })),
        )
            .into_response(),
        Ok(None) => not_found("User not found"),
        Err(e) => {
            error!(error = %e, "Failed to soft-delete user");
            internal_error("Error deleting user", &e)
        }
    }
}

/// POST /api/users/{id}/verify - Mark an account verified.
async fn verify_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match user_repo(&state).verify(id).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "User verified successfully",
                "data": user,
            })),
        )
            .into_response(),
        Ok(None) => not_found("User not found"),
        Err(e) => {
            error!(error = %e, "Failed to verify user");
            internal_error("Error verifying user", &e)
        }
    }
}

/// POST /api/users/{id}/notifications - Replace notification preferences.
async fn update_notifications(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NotificationsRequest>,
) -> Response {
    match user_repo(&state)
        .set_notifications(id, payload.notifications)
        .await
    {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Notification preferences updated successfully",
                "data": user.notifications,
            })),
        )
            .into_response(),
        Ok(None) => not_found("User not found"),
        Err(e) => {
            error!(error = %e, "Failed to update notifications");
            internal_error("Error updating notification preferences", &e)
        }
    }
}

/// POST /api/users/{id}/delete-account - Full account-deletion cascade.
///
/// Unlike DELETE (a soft delete), this hard-deletes the user's pets,
/// reports, and profile, then removes the auth account at the provider.
async fn delete_account(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.triggers().delete_account(id).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Account deleted successfully",
                "data": summary,
            })),
        )
            .into_response(),
        Err(TriggerError::UserNotFound) => not_found("User not found"),
        Err(e @ TriggerError::Identity(_)) => {
            error!(user_id = %id, error = %e, "Auth account deletion failed");
            internal_error("Error deleting auth account", &e)
        }
        Err(e) => {
            error!(user_id = %id, error = %e, "Account deletion cascade failed");
            internal_error("Error deleting account", &e)
        }
    }
}
