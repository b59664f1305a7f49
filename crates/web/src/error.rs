use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use resolver::ResolveError;
use serde_json::json;
use std::fmt;
use storage::error::StorageError;
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Resolve(ResolveError),
    Validation(ValidationErrors),
    BadRequest(String),
    /// No valid credentials on a request that needs a requester
    Unauthorized,
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Resolve(e) => write!(f, "Resolution error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
        }
    }
}

fn storage_response(error: &StorageError) -> (StatusCode, serde_json::Value) {
    match error {
        StorageError::NotFound => (
            StatusCode::NOT_FOUND,
            json!({ "error": "Resource not found" }),
        ),
        StorageError::Forbidden => (
            StatusCode::FORBIDDEN,
            json!({ "error": "You can only change your own picks" }),
        ),
        StorageError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
        StorageError::ConstraintViolation(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
        StorageError::Database(_) | StorageError::Migration(_) => {
            tracing::error!("Storage error: {:?}", error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "An internal error occurred" }),
            )
        }
    }
}

fn resolve_response(error: &ResolveError) -> (StatusCode, serde_json::Value) {
    match error {
        ResolveError::NotFound => (
            StatusCode::NOT_FOUND,
            json!({ "error": "Resource not found" }),
        ),
        ResolveError::Forbidden => (
            StatusCode::FORBIDDEN,
            json!({ "error": "You can only change your own picks" }),
        ),
        ResolveError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
        ResolveError::UpstreamNotFound(subject) => (
            StatusCode::NOT_FOUND,
            json!({ "error": format!("Could not find data for {}", subject) }),
        ),
        ResolveError::UpstreamUnavailable(msg) => {
            tracing::warn!("Knowledge source unavailable: {}", msg);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "error": "Lookup failed, try again later" }),
            )
        }
        ResolveError::Storage(e) => storage_response(e),
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status_code, body) = match &self {
            Self::Storage(e) => storage_response(e),
            Self::Resolve(e) => resolve_response(e),
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "Validation failed",
                        "details": field_errors
                    }),
                )
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Unauthorized" }),
            ),
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ResolveError> for WebError {
    fn from(error: ResolveError) -> Self {
        Self::Resolve(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

pub type WebResult<T> = Result<T, WebError>;
