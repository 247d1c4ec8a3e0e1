use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::error::{ApiResult, AppError, ValidationDetails};

/// ValidatedJson
///
/// Body extractor covering the first two stages of every mutating route:
/// the body must deserialize into `T` (else `MalformedBody`) and then pass
/// `T::validate()` (else `Validation` with a field-level details map).
///
/// Must be the last extractor in a handler signature since it consumes the body.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::MalformedBody(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| AppError::Validation(errors.into()))?;

        Ok(ValidatedJson(value))
    }
}

impl From<ValidationErrors> for ValidationDetails {
    fn from(errors: ValidationErrors) -> Self {
        let mut details = ValidationDetails::new();
        for (field, field_errors) in errors.field_errors() {
            let key = camel_case(&field);
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", error.code));
                details.add(key.clone(), message);
            }
        }
        details
    }
}

/// require
///
/// Unwraps a field that validation marks as required, reporting it under its
/// JSON name when it is absent.
pub fn require<T>(value: Option<T>, field: &str, message: &str) -> Result<T, ValidationDetails> {
    value.ok_or_else(|| {
        let mut details = ValidationDetails::new();
        details.add(field, message);
        details
    })
}

/// Converts a Rust field name (`full_name`) to its JSON spelling (`fullName`).
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// parse_id
///
/// Explicit numeric parsing for `{id}` path segments. Anything that is not an
/// integer ("abc", "NaN", "1.5") is a 400 rather than a lookup miss.
pub fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("Invalid id: {}", raw)))
}

/// Same as `parse_id` for UUID keyed resources (users).
pub fn parse_uuid(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::BadRequest(format!("Invalid id: {}", raw)))
}
