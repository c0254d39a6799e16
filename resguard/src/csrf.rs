use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::error::AuthError;

fn is_state_changing(method: &Method) -> bool {
    matches!(method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE")
}

/// Reject unauthenticated state-changing requests.
///
/// POST/PUT/PATCH/DELETE requests carrying no `Authorization` header are
/// answered with 403 and a bare `Bearer` challenge before reaching any
/// handler; bearer-authenticated writes are exempt. Safe methods pass
/// through untouched (a missing token on a GET is the extractor's 401).
///
/// Apply with `axum::middleware::from_fn`:
///
/// ```ignore
/// Router::new()
///     .route("/messages", post(create_message))
///     .layer(middleware::from_fn(csrf_protection))
/// ```
pub async fn csrf_protection(request: Request, next: Next) -> Response {
    if is_state_changing(request.method()) && !request.headers().contains_key(AUTHORIZATION) {
        warn!(method = %request.method(), uri = %request.uri(), "Blocked unauthenticated write");
        return AuthError::UnauthenticatedWrite.into_response();
    }

    next.run(request).await
}
