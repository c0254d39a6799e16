use resguard::ResourceConfig;

/// Application configuration, read from the environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Listen address (MESSAGES_ADDR, default 0.0.0.0:8080).
    pub addr: String,

    /// Expected token issuer (MESSAGES_ISSUER, default "rob").
    pub issuer: String,

    /// Expected token audience (MESSAGES_AUDIENCE, unset = not checked).
    pub audience: Option<String>,

    /// JWKS endpoint of the authorization server (MESSAGES_JWKS_URL).
    /// When unset, the app runs in dev mode with a local HS256 secret.
    pub jwks_url: Option<String>,

    /// Shared secret for dev mode (MESSAGES_DEV_SECRET).
    pub dev_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            addr: std::env::var("MESSAGES_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            issuer: std::env::var("MESSAGES_ISSUER").unwrap_or_else(|_| "rob".into()),
            audience: std::env::var("MESSAGES_AUDIENCE").ok(),
            jwks_url: std::env::var("MESSAGES_JWKS_URL").ok(),
            dev_secret: std::env::var("MESSAGES_DEV_SECRET")
                .unwrap_or_else(|_| "messages-demo-secret-change-in-production".into()),
        }
    }

    /// Build the resguard configuration for this app.
    pub fn resource_config(&self) -> ResourceConfig {
        let mut config = ResourceConfig::new(&self.issuer);
        if let Some(url) = &self.jwks_url {
            config = config.with_jwks_url(url);
        }
        if let Some(aud) = &self.audience {
            config = config.with_audience(aud);
        }
        config
    }
}
