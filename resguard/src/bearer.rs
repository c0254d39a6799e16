use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::warn;

use crate::error::AuthError;

/// Check that a credential matches the RFC 6750 `b64token` syntax:
/// one or more characters from `ALPHA / DIGIT / "-" / "." / "_" / "~" / "+" / "/"`
/// followed by any number of `"="`.
fn is_b64token(credential: &str) -> bool {
    let body = credential.trim_end_matches('=');
    !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~' | '+' | '/'))
}

/// Extract a bearer credential from an Authorization header value.
///
/// A header using another scheme is treated as "no bearer credentials
/// presented" (401), while a Bearer header whose credential violates the
/// `b64token` syntax is a malformed request (400).
fn extract_bearer_token(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.splitn(2, ' ');
    let scheme = parts.next().unwrap_or("");
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::MissingToken);
    }

    let credential = parts
        .next()
        .ok_or_else(|| AuthError::MalformedToken("empty bearer credential".into()))?;

    if !is_b64token(credential) {
        return Err(AuthError::MalformedToken(
            "credential violates the b64token syntax".into(),
        ));
    }

    Ok(credential)
}

/// Extract the bearer credential from request headers.
///
/// Returns the raw token string without validation.
pub fn bearer_token_from_parts(parts: &Parts) -> Result<&str, AuthError> {
    let auth_header = parts.headers.get(AUTHORIZATION).ok_or_else(|| {
        warn!(uri = %parts.uri, "Missing Authorization header");
        AuthError::MissingToken
    })?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AuthError::MalformedToken("non-ASCII Authorization header".into()))?;

    extract_bearer_token(auth_value)
}
