//! API route definitions.

pub mod events;
pub mod health;
pub mod pets;
pub mod users;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use validator::ValidationErrors;

use crate::multipart::MultipartForm;
use pettrack_core::asset::AssetError;
use pettrack_core::storage::StorageError;

/// One entry of a 400 field-error list.
pub(crate) fn field_error(field: &str, message: &str) -> Value {
    json!({ "field": field, "message": message })
}

/// 400 response carrying a field-error list.
pub(crate) fn validation_errors(errors: Vec<Value>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "success": false,
            "message": "Validation failed",
            "errors": errors,
        })),
    )
        .into_response()
}

/// 400 response from `validator` rule failures.
pub(crate) fn validation_failed(errors: &ValidationErrors) -> Response {
    let mut list = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        let field_name: &str = &field;
        for error in field_errors {
            let message = error
                .message
                .as_ref()
                .map_or_else(|| error.code.to_string(), ToString::to_string);
            list.push(field_error(field_name, &message));
        }
    }
    validation_errors(list)
}

/// 400 response with a single message.
pub(crate) fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}

/// 401 response with a single message.
pub(crate) fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}

/// 404 response with a single message.
pub(crate) fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}

/// 500 response surfacing the underlying error message.
pub(crate) fn internal_error(message: &str, error: &impl std::fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "message": message,
            "error": error.to_string(),
        })),
    )
        .into_response()
}

/// Pulls required text fields out of a multipart form, or produces the 400
/// listing everything that is missing.
pub(crate) fn require_fields<const N: usize>(
    form: &MultipartForm,
    names: [&str; N],
) -> Result<[String; N], Response> {
    let mut values = Vec::with_capacity(N);
    let mut missing = Vec::new();
    for name in names {
        match form.field(name) {
            Some(value) if !value.trim().is_empty() => values.push(value.trim().to_string()),
            _ => missing.push(field_error(name, &format!("{name} is required"))),
        }
    }

    if missing.is_empty() {
        // Length N by construction.
        Ok(values.try_into().unwrap_or_else(|_| unreachable!()))
    } else {
        Err(validation_errors(missing))
    }
}

/// Maps an asset lifecycle failure to a response, surfacing storage errors
/// with the given context message.
pub(crate) fn asset_error_response(context: &str, error: &AssetError) -> Response {
    match error {
        AssetError::Storage(
            storage_error @ (StorageError::FileTooLarge { .. } | StorageError::NotAnImage { .. }),
        ) => bad_request(&storage_error.to_string()),
        AssetError::TooManyFiles { .. } | AssetError::NoFiles | AssetError::PhotosNotSupported => {
            bad_request(&error.to_string())
        }
        AssetError::EntityNotFound => not_found("Entity not found"),
        AssetError::Storage(_) | AssetError::Record(_) => internal_error(context, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with(fields: &[(&str, &str)]) -> MultipartForm {
        let mut form = MultipartForm::default();
        for (name, value) in fields {
            form.fields.insert((*name).to_string(), (*value).to_string());
        }
        form
    }

    #[test]
    fn test_require_fields_all_present() {
        let form = form_with(&[("name", "A"), ("email", "a@x.com")]);

        let [name, email] = require_fields(&form, ["name", "email"]).unwrap();
        assert_eq!(name, "A");
        assert_eq!(email, "a@x.com");
    }

    #[test]
    fn test_require_fields_missing_produces_400() {
        let form = form_with(&[("name", "A")]);

        let result = require_fields(&form, ["name", "email", "phone"]);
        let response = result.unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_require_fields_blank_counts_as_missing() {
        let form = form_with(&[("name", "   ")]);

        assert!(require_fields(&form, ["name"]).is_err());
    }

    #[test]
    fn test_asset_error_status_mapping() {
        let too_many = AssetError::TooManyFiles { count: 6, max: 5 };
        assert_eq!(
            asset_error_response("ctx", &too_many).status(),
            StatusCode::BAD_REQUEST
        );

        let not_image = AssetError::Storage(StorageError::NotAnImage {
            filename: "a.pdf".into(),
            content_type: "application/pdf".into(),
        });
        assert_eq!(
            asset_error_response("ctx", &not_image).status(),
            StatusCode::BAD_REQUEST
        );

        let missing = AssetError::EntityNotFound;
        assert_eq!(
            asset_error_response("ctx", &missing).status(),
            StatusCode::NOT_FOUND
        );

        let record = AssetError::Record("boom".into());
        assert_eq!(
            asset_error_response("ctx", &record).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
