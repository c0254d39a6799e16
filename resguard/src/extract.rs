use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::{debug, warn};

use crate::bearer::bearer_token_from_parts;
use crate::error::AuthError;
use crate::jwt::{BearerToken, TokenValidator};

/// Extract and validate the bearer token from request parts.
///
/// This is the shared extraction logic used by [`BearerToken`]'s
/// `FromRequestParts` implementation. Use it directly when implementing
/// `FromRequestParts` for your own identity type backed by the same
/// validator.
pub async fn extract_bearer<S>(parts: &Parts, state: &S) -> Result<BearerToken, AuthError>
where
    S: Send + Sync,
    Arc<TokenValidator>: FromRef<S>,
{
    let credential = bearer_token_from_parts(parts)?;
    let validator: Arc<TokenValidator> = Arc::from_ref(state);

    let token = validator.validate(credential).await.map_err(|e| {
        warn!(uri = %parts.uri, error = %e, "Bearer token rejected");
        e
    })?;

    debug!(uri = %parts.uri, "Authenticated request");
    Ok(token)
}

/// Axum extractor implementation for `BearerToken`.
///
/// Extracts the credential from the `Authorization: Bearer <token>` header
/// and validates it using the `TokenValidator` from application state. The
/// rejection is [`AuthError`], so failed extraction responds with the proper
/// status and `WWW-Authenticate` challenge.
///
/// # Example
///
/// ```ignore
/// async fn protected(token: BearerToken) -> impl IntoResponse {
///     format!("Hello, {}!", token.subject().unwrap_or("anonymous"))
/// }
/// ```
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
    Arc<TokenValidator>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        extract_bearer(parts, state).await
    }
}

/// Optional extractor for `BearerToken`.
///
/// Enables `Option<BearerToken>` as a handler parameter for endpoints that
/// work both with and without authentication:
///
/// - No `Authorization` header → `Ok(None)`
/// - Valid token → `Ok(Some(token))`
/// - Invalid/malformed token → `Err(AuthError)`
impl<S> OptionalFromRequestParts<S> for BearerToken
where
    S: Send + Sync,
    Arc<TokenValidator>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(None);
        }

        extract_bearer(parts, state).await.map(Some)
    }
}
