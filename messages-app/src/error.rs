use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use resguard::AuthError;

/// Application-level errors for the messages API.
#[derive(Debug)]
pub enum ApiError {
    /// Authentication/authorization failure, rendered with the RFC 6750
    /// challenge semantics from resguard.
    Auth(AuthError),

    /// No message with the requested id.
    NotFound(u64),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Auth(err) => write!(f, "{err}"),
            ApiError::NotFound(id) => write!(f, "No message with id {id}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(err) => err.into_response(),
            ApiError::NotFound(_) => {
                let body = serde_json::json!({ "error": "not_found" });
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
        }
    }
}
