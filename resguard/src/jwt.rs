use std::sync::Arc;

use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use tracing::{debug, warn};

use crate::config::ResourceConfig;
use crate::error::AuthError;
use crate::jwks::JwksCache;
use crate::scopes::scopes_from_claims;

/// Source of decoding keys: either a JWKS cache or a static key for testing.
enum KeySource {
    Jwks(Arc<JwksCache>),
    Static(DecodingKey),
}

/// A validated bearer token: the raw JWT claims plus the parsed scope set.
#[derive(Clone, Debug)]
pub struct BearerToken {
    claims: serde_json::Value,
    scopes: Vec<String>,
}

impl BearerToken {
    /// Build a token view from already-validated claims.
    pub fn from_claims(claims: serde_json::Value) -> Self {
        let scopes = scopes_from_claims(&claims);
        Self { claims, scopes }
    }

    /// The full claim set.
    pub fn claims(&self) -> &serde_json::Value {
        &self.claims
    }

    /// Look up a single claim by name.
    pub fn claim(&self, name: &str) -> Option<&serde_json::Value> {
        self.claims.get(name)
    }

    /// The "sub" claim, if present.
    pub fn subject(&self) -> Option<&str> {
        self.claims.get("sub").and_then(|v| v.as_str())
    }

    /// The "iss" claim, if present.
    pub fn issuer(&self) -> Option<&str> {
        self.claims.get("iss").and_then(|v| v.as_str())
    }

    /// The scopes granted to this token.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Whether the token carries the given scope.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

/// Bearer-token validator.
///
/// Validates JWT credentials and returns a [`BearerToken`] carrying the raw
/// claims and scope set. Backed either by a [`JwksCache`] (production) or a
/// static decoding key (local development and tests).
pub struct TokenValidator {
    key_source: KeySource,
    config: ResourceConfig,
}

impl TokenValidator {
    /// Create a new validator backed by a JWKS cache.
    pub fn new(jwks: Arc<JwksCache>, config: ResourceConfig) -> Self {
        Self {
            key_source: KeySource::Jwks(jwks),
            config,
        }
    }

    /// Create a new validator with a static decoding key (useful for testing).
    pub fn new_with_static_key(key: DecodingKey, config: ResourceConfig) -> Self {
        Self {
            key_source: KeySource::Static(key),
            config,
        }
    }

    /// Returns the resource-server configuration.
    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Validate a JWT credential and return the bearer token.
    ///
    /// This performs:
    /// 1. Header decoding to extract `kid` and algorithm
    /// 2. Algorithm allow-list enforcement
    /// 3. Key retrieval (from JWKS cache or static key)
    /// 4. Signature validation
    /// 5. Standard claims validation (iss, aud, exp, nbf)
    pub async fn validate(&self, token: &str) -> Result<BearerToken, AuthError> {
        let header = decode_header(token)
            .map_err(|e| AuthError::InvalidToken(format!("Failed to decode header: {e}")))?;

        let algorithm = header.alg;
        debug!(?algorithm, kid = ?header.kid, "Decoded JWT header");

        if self.config.allowed_algorithms.is_empty() {
            return Err(AuthError::InvalidToken(
                "No allowed JWT algorithms configured".into(),
            ));
        }

        if !self.config.allowed_algorithms.contains(&algorithm) {
            return Err(AuthError::InvalidToken(format!(
                "Disallowed JWT algorithm: {algorithm:?}"
            )));
        }

        let decoding_key = match &self.key_source {
            KeySource::Static(key) => key.clone(),
            KeySource::Jwks(jwks) => {
                let kid = header.kid.as_deref().ok_or_else(|| {
                    AuthError::InvalidToken("JWT header missing 'kid' field".into())
                })?;
                jwks.get_key(kid).await?
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.algorithms = self.config.allowed_algorithms.clone();
        validation.set_issuer(&[&self.config.issuer]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        match &self.config.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        let token_data =
            decode::<serde_json::Value>(token, &decoding_key, &validation).map_err(|e| {
                let err = match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                        AuthError::InvalidToken("Invalid issuer".into())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                        AuthError::InvalidToken("Invalid audience".into())
                    }
                    _ => AuthError::InvalidToken(e.to_string()),
                };
                warn!(error = %err, "JWT validation failed");
                err
            })?;

        let token = BearerToken::from_claims(token_data.claims);
        debug!(sub = token.subject().unwrap_or("unknown"), "JWT validated");
        Ok(token)
    }
}
