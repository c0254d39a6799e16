use std::collections::HashMap;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::config::ResourceConfig;
use crate::error::AuthError;

/// A single key entry in a JWKS document. Only RSA signature keys are
/// supported; other key types are skipped at refresh time.
#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: Option<String>,
    kty: String,
    /// RSA modulus (base64url)
    #[serde(default)]
    n: Option<String>,
    /// RSA exponent (base64url)
    #[serde(default)]
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<Jwk>,
}

/// Stored RSA components for a cached key. `DecodingKey` does not implement
/// `Clone`, so the key is rebuilt from components on demand.
#[derive(Debug, Clone)]
struct CachedKey {
    n: String,
    e: String,
}

impl CachedKey {
    fn to_decoding_key(&self) -> Result<DecodingKey, AuthError> {
        DecodingKey::from_rsa_components(&self.n, &self.e).map_err(|err| {
            AuthError::InvalidToken(format!("Failed to construct RSA decoding key: {err}"))
        })
    }
}

struct CacheInner {
    keys: HashMap<String, CachedKey>,
    last_refresh: Option<Instant>,
    last_attempt: Option<Instant>,
}

/// Cache of public signing keys fetched from a JWKS endpoint.
///
/// Keys are indexed by `kid`. When a requested `kid` is missing or the cache
/// is past its TTL, the cache refreshes from the endpoint (rate-limited by
/// the configured minimum refresh interval) before failing.
pub struct JwksCache {
    inner: RwLock<CacheInner>,
    config: ResourceConfig,
    client: reqwest::Client,
    refresh_lock: Mutex<()>,
}

impl JwksCache {
    /// Create a new JWKS cache and perform an initial fetch of keys.
    pub async fn new(config: ResourceConfig) -> Result<Self, AuthError> {
        let cache = Self {
            inner: RwLock::new(CacheInner {
                keys: HashMap::new(),
                last_refresh: None,
                last_attempt: None,
            }),
            config,
            client: reqwest::Client::new(),
            refresh_lock: Mutex::new(()),
        };
        cache.refresh().await?;
        Ok(cache)
    }

    /// Retrieve the decoding key for the given `kid`, refreshing the cache
    /// first when the `kid` is unknown or the cache has gone stale.
    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let ttl = Duration::from_secs(self.config.jwks_cache_ttl_secs);

        let (needs_refresh, force) = {
            let inner = self.inner.read().await;
            match inner.keys.get(kid) {
                Some(key) if !is_stale(inner.last_refresh, ttl) => {
                    return key.to_decoding_key();
                }
                Some(_) => (true, false),
                None => (true, true),
            }
        };

        if needs_refresh {
            self.try_refresh(force).await?;
        }

        let inner = self.inner.read().await;
        inner
            .keys
            .get(kid)
            .ok_or_else(|| AuthError::UnknownKeyId(kid.to_string()))?
            .to_decoding_key()
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        let response = self
            .client
            .get(&self.config.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::JwksFetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthError::JwksFetch(e.to_string()))?;

        let document: JwksDocument = response
            .json()
            .await
            .map_err(|e| AuthError::JwksFetch(format!("Failed to parse JWKS: {e}")))?;

        let mut keys = HashMap::new();
        for jwk in document.keys {
            let Some(kid) = jwk.kid else { continue };
            if jwk.kty != "RSA" {
                warn!(kid = %kid, kty = %jwk.kty, "Skipping non-RSA key in JWKS");
                continue;
            }
            match (jwk.n, jwk.e) {
                (Some(n), Some(e)) => {
                    keys.insert(kid, CachedKey { n, e });
                }
                _ => warn!(kid = %kid, "Skipping RSA key with missing components"),
            }
        }

        debug!(count = keys.len(), url = %self.config.jwks_url, "Refreshed JWKS");

        let now = Instant::now();
        let mut inner = self.inner.write().await;
        inner.keys = keys;
        inner.last_refresh = Some(now);
        inner.last_attempt = Some(now);

        Ok(())
    }

    async fn try_refresh(&self, force: bool) -> Result<(), AuthError> {
        let ttl = Duration::from_secs(self.config.jwks_cache_ttl_secs);
        let min_interval = Duration::from_secs(self.config.jwks_min_refresh_interval_secs);

        let _guard = self.refresh_lock.lock().await;

        {
            let inner = self.inner.read().await;
            if !force && !is_stale(inner.last_refresh, ttl) {
                return Ok(());
            }
            if !can_attempt(inner.last_attempt, min_interval) {
                return Ok(());
            }
        }

        {
            let mut inner = self.inner.write().await;
            inner.last_attempt = Some(Instant::now());
        }

        self.refresh().await
    }
}

fn is_stale(last_refresh: Option<Instant>, ttl: Duration) -> bool {
    match last_refresh {
        None => true,
        Some(ts) => ts.elapsed() >= ttl,
    }
}

fn can_attempt(last_attempt: Option<Instant>, min_interval: Duration) -> bool {
    match last_attempt {
        None => true,
        Some(ts) => ts.elapsed() >= min_interval,
    }
}

#[cfg(test)]
mod tests {
    use super::{can_attempt, is_stale};
    use std::time::{Duration, Instant};

    #[test]
    fn stale_when_never_refreshed() {
        assert!(is_stale(None, Duration::from_secs(60)));
    }

    #[test]
    fn stale_when_ttl_elapsed() {
        let ts = Instant::now() - Duration::from_secs(61);
        assert!(is_stale(Some(ts), Duration::from_secs(60)));
    }

    #[test]
    fn fresh_before_ttl() {
        let ts = Instant::now() - Duration::from_secs(10);
        assert!(!is_stale(Some(ts), Duration::from_secs(60)));
    }

    #[test]
    fn attempt_allowed_when_never_attempted() {
        assert!(can_attempt(None, Duration::from_secs(10)));
    }

    #[test]
    fn attempt_debounced_too_soon() {
        let ts = Instant::now() - Duration::from_secs(3);
        assert!(!can_attempt(Some(ts), Duration::from_secs(10)));
    }
}
