//! Pet routes: registration, listing, photos, lost/found status.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::multipart::MultipartForm;
use crate::routes::{
    asset_error_response, bad_request, field_error, internal_error, not_found, require_fields,
    validation_errors, validation_failed,
};
use crate::AppState;
use pettrack_core::asset::ImageOwner;
use pettrack_db::entities::sea_orm_active_enums::{Gender, PetColor, PetType};
use pettrack_db::repositories::{NewPet, PetFilter, PetRepository, PetUpdate, UserRepository};
use pettrack_shared::types::{PageRequest, PageResponse};

/// Creates the pet routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_pet).get(list_pets))
        .route("/{id}", get(get_pet).put(update_pet).delete(delete_pet))
        .route("/{id}/upload-photos", post(upload_photos))
        .route("/{id}/mark-lost", post(mark_lost))
        .route("/{id}/mark-found", post(mark_found))
        .route("/owner/{owner_id}", get(pets_by_owner))
}

// ============================================================================
// Request Types
// ============================================================================

/// Validated pet profile fields, shared by create and update.
#[derive(Debug, Validate)]
struct PetData {
    #[validate(length(min = 1, max = 50, message = "Pet name must be between 1 and 50 characters"))]
    pet_name: String,
    pet_type: PetType,
    #[validate(length(min = 1, max = 100, message = "Breed must be between 1 and 100 characters"))]
    breed: String,
    gender: Gender,
    color: PetColor,
    #[validate(length(
        min = 1,
        max = 200,
        message = "Home location must be between 1 and 200 characters"
    ))]
    home_location: String,
    owner_id: Uuid,
}

/// Raw pet list query parameters.
///
/// Values are kept as strings so malformed filters can be dropped instead
/// of failing deserialization on a public listing endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPetsQuery {
    owner_id: Option<String>,
    pet_type: Option<String>,
    is_lost: Option<String>,
    is_found: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

impl ListPetsQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            limit: self.limit.unwrap_or(defaults.limit),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn pet_repo(state: &AppState) -> PetRepository {
    PetRepository::new((*state.db).clone())
}

/// Parses and validates the pet profile fields of a multipart form.
fn parse_pet_form(form: &MultipartForm) -> Result<PetData, Response> {
    let [pet_name, pet_type, breed, gender, color, home_location, owner_id] = require_fields(
        form,
        [
            "petName",
            "petType",
            "breed",
            "gender",
            "color",
            "homeLocation",
            "ownerId",
        ],
    )?;

    let mut errors = Vec::new();
    let pet_type: Option<PetType> = pet_type.parse().ok();
    if pet_type.is_none() {
        errors.push(field_error("petType", "Please select a valid pet type"));
    }
    let gender: Option<Gender> = gender.parse().ok();
    if gender.is_none() {
        errors.push(field_error("gender", "Please mention the gender"));
    }
    let color: Option<PetColor> = color.parse().ok();
    if color.is_none() {
        errors.push(field_error("color", "Please select a valid color"));
    }
    let owner_id = Uuid::parse_str(&owner_id).ok();
    if owner_id.is_none() {
        errors.push(field_error("ownerId", "Valid owner ID is required"));
    }
    if !errors.is_empty() {
        return Err(validation_errors(errors));
    }

    let data = PetData {
        pet_name,
        pet_type: pet_type.unwrap_or(PetType::Other),
        breed,
        gender: gender.unwrap_or(Gender::Male),
        color: color.unwrap_or(PetColor::Other),
        home_location,
        owner_id: owner_id.unwrap_or_default(),
    };
    data.validate().map_err(|errors| validation_failed(&errors))?;
    Ok(data)
}

/// Referential-integrity check: the owner must be a live user.
async fn owner_exists(state: &AppState, owner_id: Uuid) -> Result<(), Response> {
    match UserRepository::new((*state.db).clone())
        .find_by_id(owner_id)
        .await
    {
        Ok(Some(user)) if user.is_active => Ok(()),
        Ok(_) => Err(bad_request("Owner does not exist")),
        Err(e) => {
            error!(error = %e, "Database error checking owner");
            Err(internal_error("Error validating owner", &e))
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/pets - Register a pet (multipart, optional profile image).
async fn create_pet(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match MultipartForm::collect(multipart).await {
        Ok(form) => form,
        Err(e) => return bad_request(&format!("Malformed multipart request: {e}")),
    };

    let data = match parse_pet_form(&form) {
        Ok(data) => data,
        Err(response) => return response,
    };

    if let Err(response) = owner_exists(&state, data.owner_id).await {
        return response;
    }

    // Upload before any record write.
    let profile_image = match form.file("profileImage") {
        Some(file) => match state.assets().attach_image(file, "pets").await {
            Ok(url) => Some(url),
            Err(e) => {
                error!(error = %e, "Pet image upload failed");
                return asset_error_response("Error uploading image", &e);
            }
        },
        None => None,
    };

    match pet_repo(&state)
        .create(NewPet {
            pet_name: data.pet_name,
            pet_type: data.pet_type,
            breed: data.breed,
            gender: data.gender,
            color: data.color,
            home_location: data.home_location,
            profile_image,
            owner_id: data.owner_id,
        })
        .await
    {
        Ok(pet) => {
            info!(pet_id = %pet.id, owner_id = %pet.owner_id, "Pet registered");
            (
                StatusCode::CREATED,
                Json(json!({
                    "success": true,
                    "message": "Pet profile created successfully",
                    "data": pet,
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create pet");
            internal_error("Error creating pet profile", &e)
        }
    }
}

/// GET /api/pets - List active pets with filters and pagination.
async fn list_pets(State(state): State<AppState>, Query(query): Query<ListPetsQuery>) -> Response {
    let filter = PetFilter::parse(
        query.owner_id.as_deref(),
        query.pet_type.as_deref(),
        query.is_lost.as_deref(),
        query.is_found.as_deref(),
    );

    let page = query.page_request();
    match pet_repo(&state).list(&filter, &page).await {
        Ok((pets, total)) => {
            let response = PageResponse::new(pets, page.page, page.limit, total);
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
            error!(error = %e, "Failed to list pets");
            internal_error("Error fetching pets", &e)
        }
    }
}

/// GET /api/pets/{id} - Fetch a pet by id (soft-deleted included).
async fn get_pet(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match pet_repo(&state).find_by_id(id).await {
        Ok(Some(pet)) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": pet })),
        )
            .into_response(),
        Ok(None) => not_found("Pet not found"),
        Err(e) => {
            error!(error = %e, "Failed to fetch pet");
            internal_error("Error fetching pet", &e)
        }
    }
}

/// PUT /api/pets/{id} - Update a pet profile (multipart, optional image).
///
/// `isLost`/`isFound` are not accepted here; the mark-lost and mark-found
/// operations are the only writers of those flags.
async fn update_pet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Response {
    let form = match MultipartForm::collect(multipart).await {
        Ok(form) => form,
        Err(e) => return bad_request(&format!("Malformed multipart request: {e}")),
    };

    let data = match parse_pet_form(&form) {
        Ok(data) => data,
        Err(response) => return response,
    };

    let repo = pet_repo(&state);
    match repo.find_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("Pet not found"),
        Err(e) => return internal_error("Error updating pet profile", &e),
    }

    if let Err(response) = owner_exists(&state, data.owner_id).await {
        return response;
    }

    // Image first: a failed upload must abort before any record mutation.
    // The coordinator persists the new URL and then retires the old object.
    if let Some(file) = form.file("profileImage") {
        let owner = ImageOwner::Pet(id);
        if let Err(e) = state
            .assets()
            .replace_profile_image(owner, file, owner.folder())
            .await
        {
            error!(pet_id = %id, error = %e, "Pet image replace failed");
            return asset_error_response("Error uploading image", &e);
        }
    }

    match repo
        .update(
            id,
            PetUpdate {
                pet_name: data.pet_name,
                pet_type: data.pet_type,
                breed: data.breed,
                gender: data.gender,
                color: data.color,
                home_location: data.home_location,
                owner_id: data.owner_id,
            },
        )
        .await
    {
        Ok(Some(pet)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Pet profile updated successfully",
                "data": pet,
            })),
        )
            .into_response(),
        Ok(None) => not_found("Pet not found"),
        Err(e) => {
            error!(error = %e, "Failed to update pet");
            internal_error("Error updating pet profile", &e)
        }
    }
}

/// DELETE /api/pets/{id} - Soft-delete a pet.
///
/// All stored images are removed best-effort first; failures never block
/// the soft delete.
async fn delete_pet(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = pet_repo(&state);
    match repo.find_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("Pet not found"),
        Err(e) => return internal_error("Error deleting pet profile", &e),
    }

    state.assets().remove_all_images(ImageOwner::Pet(id)).await;

    match repo.soft_delete(id).await {
        Ok(Some(_)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Pet profile deleted successfully",
            })),
        )
            .into_response(),
        Ok(None) => not_found("Pet not found"),
        Err(e) => {
            error!(error = %e, "Failed to soft-delete pet");
            internal_error("Error deleting pet profile", &e)
        }
    }
}

/// POST /api/pets/{id}/upload-photos - Append photos (multipart `photos`).
///
/// The batch is capped per request and is all-or-nothing at the record
/// layer: either every photo joins the list or none do.
async fn upload_photos(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Response {
    let form = match MultipartForm::collect(multipart).await {
        Ok(form) => form,
        Err(e) => return bad_request(&format!("Malformed multipart request: {e}")),
    };

    let repo = pet_repo(&state);
    match repo.find_by_id(id).await {
        Ok(Some(pet)) if pet.is_active => {}
        Ok(_) => return not_found("Pet not found"),
        Err(e) => return internal_error("Error uploading photos", &e),
    }

    let files = form.files("photos");
    if files.is_empty() {
        return bad_request("No photos uploaded");
    }

    let owner = ImageOwner::Pet(id);
    let urls = match state
        .assets()
        .append_photos(owner, files, owner.folder(), state.max_photos_per_request)
        .await
    {
        Ok(urls) => urls,
        Err(e) => {
            error!(pet_id = %id, error = %e, "Photo batch upload failed");
            return asset_error_response("Error uploading photos", &e);
        }
    };

    let total_photos = match repo.find_by_id(id).await {
        Ok(Some(pet)) => pet.additional_photos.len(),
        _ => urls.len(),
    };

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Photos uploaded successfully",
            "data": {
                "petId": id,
                "newPhotos": urls,
                "totalPhotos": total_photos,
            },
        })),
    )
        .into_response()
}

/// POST /api/pets/{id}/mark-lost - Flag a pet as lost.
async fn mark_lost(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match pet_repo(&state).mark_lost(id).await {
        Ok(Some(pet)) => {
            info!(pet_id = %id, "Pet marked as lost");
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": "Pet marked as lost successfully",
                    "data": pet,
                })),
            )
                .into_response()
        }
        Ok(None) => not_found("Pet not found"),
        Err(e) => {
            error!(error = %e, "Failed to mark pet as lost");
            internal_error("Error marking pet as lost", &e)
        }
    }
}

/// POST /api/pets/{id}/mark-found - Flag a pet as found.
async fn mark_found(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match pet_repo(&state).mark_found(id).await {
        Ok(Some(pet)) => {
            info!(pet_id = %id, "Pet marked as found");
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": "Pet marked as found successfully",
                    "data": pet,
                })),
            )
                .into_response()
        }
        Ok(None) => not_found("Pet not found"),
        Err(e) => {
            error!(error = %e, "Failed to mark pet as found");
            internal_error("Error marking pet as found", &e)
        }
    }
}

/// GET /api/pets/owner/{owner_id} - All active pets for an owner.
async fn pets_by_owner(State(state): State<AppState>, Path(owner_id): Path<Uuid>) -> Response {
    match pet_repo(&state).find_by_owner(owner_id).await {
        Ok(pets) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": pets })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to fetch owner pets");
            internal_error("Error fetching owner pets", &e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pet_form(fields: &[(&str, &str)]) -> MultipartForm {
        let mut form = MultipartForm::default();
        for (name, value) in fields {
            form.fields.insert((*name).to_string(), (*value).to_string());
        }
        form
    }

    fn valid_fields(owner_id: &str) -> Vec<(String, String)> {
        vec![
            ("petName".to_string(), "Buddy".to_string()),
            ("petType".to_string(), "Dog".to_string()),
            ("breed".to_string(), "Golden Retriever".to_string()),
            ("gender".to_string(), "Male".to_string()),
            ("color".to_string(), "Golden".to_string()),
            ("homeLocation".to_string(), "123 Main St".to_string()),
            ("ownerId".to_string(), owner_id.to_string()),
        ]
    }

    #[test]
    fn test_parse_pet_form_valid() {
        let owner = Uuid::new_v4();
        let fields = valid_fields(&owner.to_string());
        let fields: Vec<(&str, &str)> = fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let form = pet_form(&fields);

        let data = parse_pet_form(&form).unwrap();
        assert_eq!(data.pet_name, "Buddy");
        assert_eq!(data.pet_type, PetType::Dog);
        assert_eq!(data.gender, Gender::Male);
        assert_eq!(data.color, PetColor::Golden);
        assert_eq!(data.owner_id, owner);
    }

    #[test]
    fn test_parse_pet_form_invalid_enum_is_400() {
        let owner = Uuid::new_v4().to_string();
        let mut fields = valid_fields(&owner);
        fields[1].1 = "Dragon".to_string();
        let fields: Vec<(&str, &str)> = fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let form = pet_form(&fields);

        let response = parse_pet_form(&form).unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_pet_form_bad_owner_id_is_400() {
        let mut fields = valid_fields("not-a-uuid");
        fields[0].1 = "Buddy".to_string();
        let fields: Vec<(&str, &str)> = fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let form = pet_form(&fields);

        let response = parse_pet_form(&form).unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_pet_form_missing_fields_is_400() {
        let form = pet_form(&[("petName", "Buddy")]);
        let response = parse_pet_form(&form).unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_page_request_defaults() {
        let query = ListPetsQuery {
            owner_id: None,
            pet_type: None,
            is_lost: None,
            is_found: None,
            page: None,
            limit: None,
        };
        let page = query.page_request();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 20);

        let query = ListPetsQuery {
            owner_id: None,
            pet_type: None,
            is_lost: None,
            is_found: None,
            page: Some(3),
            limit: Some(50),
        };
        let page = query.page_request();
        assert_eq!(page.page, 3);
        assert_eq!(page.limit, 50);
    }
}
