use jsonwebtoken::Algorithm;

/// Configuration for bearer-token validation and the JWKS cache.
#[derive(Clone, Debug)]
pub struct ResourceConfig {
    /// URL of the JWKS endpoint (e.g., https://auth.example.com/.well-known/jwks.json).
    /// Unused when the validator is built with a static key.
    pub jwks_url: String,

    /// Expected issuer in the "iss" claim.
    pub issuer: String,

    /// Expected audience in the "aud" claim. When `None`, the audience
    /// claim is not checked.
    pub audience: Option<String>,

    /// JWKS cache TTL in seconds (default: 3600).
    pub jwks_cache_ttl_secs: u64,

    /// Minimum interval between JWKS refresh attempts in seconds (default: 10).
    pub jwks_min_refresh_interval_secs: u64,

    /// Allowed JWT algorithms. Tokens using other algorithms are rejected.
    /// Default: RS256 only.
    pub allowed_algorithms: Vec<Algorithm>,
}

impl ResourceConfig {
    /// Create a new ResourceConfig for the given issuer, with no audience
    /// check and a default cache TTL of 3600s.
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            jwks_url: String::new(),
            issuer: issuer.into(),
            audience: None,
            jwks_cache_ttl_secs: 3600,
            jwks_min_refresh_interval_secs: 10,
            allowed_algorithms: vec![Algorithm::RS256],
        }
    }

    /// Set the JWKS endpoint URL.
    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    /// Require the "aud" claim to match the given audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Set the JWKS cache TTL in seconds.
    pub fn with_cache_ttl(mut self, ttl_secs: u64) -> Self {
        self.jwks_cache_ttl_secs = ttl_secs;
        self
    }

    /// Set the minimum interval between JWKS refresh attempts.
    pub fn with_min_refresh_interval(mut self, interval_secs: u64) -> Self {
        self.jwks_min_refresh_interval_secs = interval_secs;
        self
    }

    /// Set the allowed JWT algorithms. Empty lists will cause validation to fail.
    pub fn with_allowed_algorithms(
        mut self,
        algorithms: impl IntoIterator<Item = Algorithm>,
    ) -> Self {
        self.allowed_algorithms = algorithms.into_iter().collect();
        self
    }

    /// Add a single allowed JWT algorithm.
    pub fn with_allowed_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.allowed_algorithms.push(algorithm);
        self
    }
}
