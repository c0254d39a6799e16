pub mod bearer;
pub mod config;
pub mod csrf;
pub mod error;
pub mod extract;
pub mod jwks;
pub mod jwt;
pub mod scopes;

// Re-export primary public types for convenience.
pub use bearer::bearer_token_from_parts;
pub use config::ResourceConfig;
pub use csrf::csrf_protection;
pub use error::AuthError;
pub use extract::extract_bearer;
pub use jwks::JwksCache;
pub use jwt::{BearerToken, TokenValidator};
pub use scopes::{scopes_from_claims, RequiredScopes};

pub mod prelude {
    //! Re-exports of the most commonly used resource-server types.
    pub use crate::{AuthError, BearerToken, RequiredScopes, ResourceConfig, TokenValidator};
}
