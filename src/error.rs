use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::repository::PersistenceError;

/// ApiResult
///
/// Return type of every fallible handler.
pub type ApiResult<T> = Result<T, AppError>;

/// ValidationDetails
///
/// Field-level validation messages keyed by the camelCase JSON field name.
/// Serialized as a plain object: `{ "email": ["Invalid email format"] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationDetails(BTreeMap<String, Vec<String>>);

impl ValidationDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Turns accumulated messages into an error, or `Ok(())` if nothing was recorded.
    pub fn into_result(self) -> ApiResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

/// AppError
///
/// The request-level failure taxonomy. Validation and authentication failures are
/// reported immediately as 4xx; persistence failures are logged and surfaced as a
/// generic 500 without internal detail. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The body was not valid JSON for the target type.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("validation failed")]
    Validation(ValidationDetails),

    /// Unparseable path or query input (e.g. a non-numeric id).
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("authentication required")]
    Unauthenticated,

    #[error("insufficient permissions")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("persistence failure: {0}")]
    Persistence(#[source] PersistenceError),
}

impl From<ValidationDetails> for AppError {
    fn from(details: ValidationDetails) -> Self {
        AppError::Validation(details)
    }
}

impl From<PersistenceError> for AppError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Conflict(what) => AppError::Conflict(what),
            other => AppError::Persistence(other),
        }
    }
}

/// ErrorBody
///
/// The stable error shape: `{ error }` or `{ error, details }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ValidationDetails>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedBody(_) | AppError::Validation(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            AppError::MalformedBody(reason) => {
                tracing::debug!(%reason, "rejecting malformed body");
                ErrorBody {
                    error: "Malformed request body".to_string(),
                    details: None,
                }
            }
            AppError::Validation(details) => ErrorBody {
                error: "Validation failed".to_string(),
                details: Some(details),
            },
            AppError::BadRequest(msg) => ErrorBody {
                error: msg,
                details: None,
            },
            AppError::Unauthenticated => ErrorBody {
                error: "Unauthorized".to_string(),
                details: None,
            },
            AppError::Forbidden => ErrorBody {
                error: "Forbidden".to_string(),
                details: None,
            },
            AppError::NotFound(what) => ErrorBody {
                error: format!("{} not found", what),
                details: None,
            },
            AppError::Conflict(msg) => ErrorBody {
                error: msg,
                details: None,
            },
            AppError::Persistence(err) => {
                // Logged here, never echoed to the client.
                tracing::error!("persistence error: {:?}", err);
                ErrorBody {
                    error: "Internal server error".to_string(),
                    details: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_details_accumulate_per_field() {
        let mut details = ValidationDetails::new();
        details.add("email", "Email is required");
        details.add("email", "Invalid email format");
        details.add("name", "Name is required");

        assert_eq!(details.get("email").map(<[String]>::len), Some(2));
        assert!(details.contains("name"));
        assert!(!details.contains("message"));

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["name"][0], "Name is required");
    }

    #[test]
    fn test_empty_details_are_ok() {
        assert!(ValidationDetails::new().into_result().is_ok());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("Contact").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::MalformedBody("eof".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Validation(ValidationDetails::new()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_persistence_conflict_becomes_409() {
        let err: AppError = PersistenceError::Conflict("email already in use".into()).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err: AppError = PersistenceError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
