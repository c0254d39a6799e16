use crate::error::AuthError;
use crate::jwt::BearerToken;

/// Extract the scope set from validated JWT claims.
///
/// Providers encode scopes either as a space-delimited `scope` string
/// (RFC 8693 style) or as a `scp` JSON array. The first non-empty result
/// wins.
pub fn scopes_from_claims(claims: &serde_json::Value) -> Vec<String> {
    let from_scope = claims
        .get("scope")
        .and_then(|v| v.as_str())
        .map(|s| s.split_whitespace().map(String::from).collect::<Vec<_>>())
        .unwrap_or_default();

    if !from_scope.is_empty() {
        return from_scope;
    }

    claims
        .get("scp")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|s| s.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// The scopes an endpoint requires, with any-of semantics.
///
/// # Example
///
/// ```ignore
/// let read = RequiredScopes::any(["message.read"]);
/// read.check(&token)?;
/// ```
#[derive(Clone, Debug)]
pub struct RequiredScopes {
    scopes: Vec<String>,
}

impl RequiredScopes {
    /// Require any of the given scopes.
    pub fn any(scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    /// The required scope names.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Check the token against this requirement.
    ///
    /// Fails with [`AuthError::InsufficientScope`] (rendered as the RFC 6750
    /// `insufficient_scope` challenge) when the token carries none of the
    /// required scopes.
    pub fn check(&self, token: &BearerToken) -> Result<(), AuthError> {
        let granted = token.scopes();
        let satisfied = self
            .scopes
            .iter()
            .any(|req| granted.iter().any(|s| s == req));

        if satisfied {
            Ok(())
        } else {
            Err(AuthError::InsufficientScope {
                required: self.scopes.clone(),
            })
        }
    }
}
