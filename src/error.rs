// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::StoreError;
use crate::storage::StorageError;
use crate::validation::ValidationErrors;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError(ValidationErrors),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError(_) => "invalid payload",
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Convert to JSON response body: `{ error, code }`, where `error` carries
    /// the flattened field errors for validation failures
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError(errors) => {
                json!({
                    "error": errors,
                    "code": self.error_code()
                })
            }
            _ => {
                json!({
                    "error": self.message(),
                    "code": self.error_code()
                })
            }
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(errors: ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

// Convert other error types to ApiError
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        // Log the real error but return generic message
        tracing::error!("Store error: {}", err);
        ApiError::internal_server_error("An error occurred while processing your request")
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::error!("Object storage error: {}", err);
        ApiError::internal_server_error("Failed to sign upload")
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unavailable(msg) => {
                tracing::error!("Identity provider unavailable: {}", msg);
                ApiError::internal_server_error("Failed to resolve session")
            }
            other => {
                tracing::warn!("Rejected session: {}", other);
                ApiError::unauthorized("unauthorized")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_errors_render_message_and_code() {
        let err = ApiError::forbidden("forbidden");
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.to_json(), json!({ "error": "forbidden", "code": "FORBIDDEN" }));
    }

    #[test]
    fn validation_errors_render_structured_error() {
        let err = ApiError::validation_error(ValidationErrors::field("name", "Required"));
        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.to_json(),
            json!({
                "error": { "formErrors": [], "fieldErrors": { "name": ["Required"] } },
                "code": "VALIDATION_ERROR"
            })
        );
    }

    #[test]
    fn status_and_code_cover_every_variant() {
        let cases = [
            (ApiError::bad_request("x"), 400, "BAD_REQUEST"),
            (ApiError::validation_error(ValidationErrors::default()), 400, "VALIDATION_ERROR"),
            (ApiError::unauthorized("x"), 401, "UNAUTHORIZED"),
            (ApiError::forbidden("x"), 403, "FORBIDDEN"),
            (ApiError::internal_server_error("x"), 500, "INTERNAL_SERVER_ERROR"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_code(), status);
            assert_eq!(err.error_code(), code);
        }
    }

    #[test]
    fn store_faults_become_internal_errors() {
        let err: ApiError = StoreError::Unavailable("down".to_string()).into();
        assert_eq!(err.status_code(), 500);
        assert!(!err.message().contains("down"));
    }

    #[test]
    fn auth_errors_split_between_401_and_500() {
        let missing: ApiError = AuthError::MissingCredentials.into();
        assert_eq!(missing.status_code(), 401);

        let invalid: ApiError = AuthError::InvalidToken("expired".to_string()).into();
        assert_eq!(invalid.status_code(), 401);

        let down: ApiError = AuthError::Unavailable("timeout".to_string()).into();
        assert_eq!(down.status_code(), 500);
    }
}
