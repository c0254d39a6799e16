use axum::http::header::WWW_AUTHENTICATE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// The `error_uri` advertised in bearer challenges, pointing at the
/// RFC 6750 error-code registry section.
pub const BEARER_ERROR_URI: &str = "https://tools.ietf.org/html/rfc6750#section-3.1";

/// Authentication/authorization failures for bearer-token protected resources.
///
/// Every variant maps to an HTTP status and (except for server-side JWKS
/// failures) a `WWW-Authenticate: Bearer ...` challenge per RFC 6750.
#[derive(Debug)]
pub enum AuthError {
    /// No bearer credentials were presented.
    MissingToken,

    /// A state-changing request was made without any credentials.
    UnauthenticatedWrite,

    /// The credential violates the RFC 6750 `b64token` syntax.
    MalformedToken(String),

    /// The token failed JWT parsing or claim validation (bad signature,
    /// wrong issuer/audience, disallowed algorithm, ...).
    InvalidToken(String),

    /// The token has expired.
    TokenExpired,

    /// The key ID (kid) from the JWT header is not found in the JWKS.
    UnknownKeyId(String),

    /// Failed to fetch the JWKS from the remote endpoint.
    JwksFetch(String),

    /// The token does not carry any of the scopes the resource requires.
    InsufficientScope { required: Vec<String> },
}

impl AuthError {
    /// HTTP status for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::UnauthenticatedWrite => StatusCode::FORBIDDEN,
            AuthError::MalformedToken(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidToken(_) | AuthError::TokenExpired | AuthError::UnknownKeyId(_) => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::JwksFetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::InsufficientScope { .. } => StatusCode::FORBIDDEN,
        }
    }

    /// RFC 6750 error code, if the failure carries one.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            AuthError::MissingToken | AuthError::UnauthenticatedWrite => None,
            AuthError::MalformedToken(_) => Some("invalid_request"),
            AuthError::InvalidToken(_) | AuthError::TokenExpired | AuthError::UnknownKeyId(_) => {
                Some("invalid_token")
            }
            AuthError::JwksFetch(_) => None,
            AuthError::InsufficientScope { .. } => Some("insufficient_scope"),
        }
    }

    /// Render the `WWW-Authenticate` challenge for this failure.
    ///
    /// Returns `None` for server-side failures that must not leak a
    /// challenge (JWKS fetch errors). Missing credentials produce the bare
    /// `Bearer` challenge; everything else carries `error`,
    /// `error_description` and `error_uri` attributes.
    pub fn challenge(&self) -> Option<String> {
        let code = match self {
            AuthError::MissingToken | AuthError::UnauthenticatedWrite => {
                return Some("Bearer".to_string());
            }
            AuthError::JwksFetch(_) => return None,
            other => other.error_code()?,
        };

        let description = match self {
            AuthError::MalformedToken(_) => "Bearer token is malformed".to_string(),
            AuthError::TokenExpired => "Bearer token has expired".to_string(),
            AuthError::InvalidToken(reason) => quote_safe(reason),
            AuthError::UnknownKeyId(kid) => quote_safe(&format!("Unknown signing key: {kid}")),
            AuthError::InsufficientScope { required } => format!(
                "Resource requires any or all of these scopes [{}]",
                required.join(", ")
            ),
            _ => unreachable!(),
        };

        let mut challenge = format!(
            "Bearer error=\"{code}\", error_description=\"{description}\", error_uri=\"{BEARER_ERROR_URI}\""
        );

        if let AuthError::InsufficientScope { required } = self {
            challenge.push_str(&format!(", scope=\"{}\"", required.join(" ")));
        }

        Some(challenge)
    }

    /// Short machine-readable code used in JSON error bodies.
    fn public_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "unauthorized",
            AuthError::UnauthenticatedWrite => "access_denied",
            AuthError::JwksFetch(_) => "server_error",
            other => other.error_code().unwrap_or("unauthorized"),
        }
    }
}

/// Strip characters that are not allowed inside an RFC 6750 quoted-string
/// (double quotes, backslashes, and control characters).
fn quote_safe(input: &str) -> String {
    input
        .chars()
        .filter(|c| matches!(c, ' '..='~') && *c != '"' && *c != '\\')
        .collect()
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing bearer token"),
            AuthError::UnauthenticatedWrite => {
                write!(f, "State-changing request without credentials")
            }
            AuthError::MalformedToken(msg) => write!(f, "Malformed token: {msg}"),
            AuthError::InvalidToken(msg) => write!(f, "Invalid token: {msg}"),
            AuthError::TokenExpired => write!(f, "Token expired"),
            AuthError::UnknownKeyId(kid) => write!(f, "Unknown signing key: {kid}"),
            AuthError::JwksFetch(msg) => write!(f, "JWKS fetch error: {msg}"),
            AuthError::InsufficientScope { required } => {
                write!(f, "Insufficient scope, requires any of [{}]", required.join(", "))
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.public_code() });
        let mut response = (self.status(), Json(body)).into_response();

        if let Some(challenge) = self.challenge() {
            match challenge.parse() {
                Ok(value) => {
                    response.headers_mut().insert(WWW_AUTHENTICATE, value);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Failed to render WWW-Authenticate challenge");
                }
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_is_bare_challenge() {
        let err = AuthError::MissingToken;
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.challenge().as_deref(), Some("Bearer"));
    }

    #[test]
    fn unauthenticated_write_is_forbidden_with_bare_challenge() {
        let err = AuthError::UnauthenticatedWrite;
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.challenge().as_deref(), Some("Bearer"));
    }

    #[test]
    fn malformed_token_is_invalid_request() {
        let err = AuthError::MalformedToken("bad characters".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let challenge = err.challenge().unwrap();
        assert!(challenge.starts_with("Bearer error=\"invalid_request\""));
        assert!(challenge.contains("error_description=\"Bearer token is malformed\""));
        assert!(challenge.contains(&format!("error_uri=\"{BEARER_ERROR_URI}\"")));
    }

    #[test]
    fn insufficient_scope_challenge_names_required_scopes() {
        let err = AuthError::InsufficientScope {
            required: vec!["message.read".into()],
        };
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            err.challenge().as_deref(),
            Some(
                "Bearer error=\"insufficient_scope\", \
                 error_description=\"Resource requires any or all of these scopes [message.read]\", \
                 error_uri=\"https://tools.ietf.org/html/rfc6750#section-3.1\", \
                 scope=\"message.read\""
            )
        );
    }

    #[test]
    fn insufficient_scope_challenge_joins_multiple_scopes() {
        let err = AuthError::InsufficientScope {
            required: vec!["message.read".into(), "message.write".into()],
        };
        let challenge = err.challenge().unwrap();
        assert!(challenge.contains("[message.read, message.write]"));
        assert!(challenge.contains("scope=\"message.read message.write\""));
    }

    #[test]
    fn invalid_token_description_strips_quotes() {
        let err = AuthError::InvalidToken("contains \"quotes\" and \\slashes".into());
        let challenge = err.challenge().unwrap();
        assert!(challenge.contains("error=\"invalid_token\""));
        assert!(challenge.contains("contains quotes and slashes"));
    }

    #[test]
    fn jwks_failure_has_no_challenge() {
        let err = AuthError::JwksFetch("connection refused".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.challenge().is_none());
    }
}
