use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use rand::rngs::OsRng;
use rsa::pkcs8::EncodePrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::{Map, Value};

use resguard::{ResourceConfig, TokenValidator};

/// RS256 signing fixture for tests.
///
/// Generates a fresh RSA-2048 key pair and mints signed tokens via
/// [`TokenBuilder`]. Wire the matching [`TokenValidator`] into the
/// application state with [`TestSigner::validator`].
///
/// # Example
///
/// ```ignore
/// let signer = TestSigner::new();
/// let validator = Arc::new(signer.validator(ResourceConfig::new("rob")));
/// let token = signer.token().issuer("rob").scope("message.read").build();
/// ```
pub struct TestSigner {
    encoding_key: EncodingKey,
    /// Base64url-encoded RSA modulus.
    n: String,
    /// Base64url-encoded RSA public exponent.
    e: String,
    kid: String,
}

impl TestSigner {
    /// Generate a new RSA-2048 signing fixture.
    pub fn new() -> Self {
        let private_key =
            RsaPrivateKey::new(&mut OsRng, 2048).expect("failed to generate RSA-2048 key");
        let public_key = RsaPublicKey::from(&private_key);

        let pkcs8_pem = private_key
            .to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)
            .expect("failed to export RSA key as PKCS8 PEM");
        let encoding_key = EncodingKey::from_rsa_pem(pkcs8_pem.as_bytes())
            .expect("failed to create EncodingKey from RSA PEM");

        let n = URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
        let e = URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());

        Self {
            encoding_key,
            n,
            e,
            kid: "test-key".to_string(),
        }
    }

    /// Returns the decoding key matching this signer's key pair.
    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_rsa_components(&self.n, &self.e)
            .expect("failed to create DecodingKey from RSA components")
    }

    /// Build a static-key [`TokenValidator`] for this signer.
    pub fn validator(&self, config: ResourceConfig) -> TokenValidator {
        TokenValidator::new_with_static_key(self.decoding_key(), config)
    }

    /// Start building a token signed by this key pair.
    pub fn token(&self) -> TokenBuilder<'_> {
        TokenBuilder::new(self)
    }
}

impl Default for TestSigner {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for RS256 test tokens.
///
/// Unless overridden, tokens expire one hour from now. Scopes accumulate
/// into the space-delimited `scope` claim.
pub struct TokenBuilder<'a> {
    signer: &'a TestSigner,
    claims: Map<String, Value>,
    scopes: Vec<String>,
}

impl<'a> TokenBuilder<'a> {
    fn new(signer: &'a TestSigner) -> Self {
        Self {
            signer,
            claims: Map::new(),
            scopes: Vec::new(),
        }
    }

    /// Set the `iss` claim.
    pub fn issuer(self, issuer: &str) -> Self {
        self.claim("iss", issuer)
    }

    /// Set the `sub` claim.
    pub fn subject(self, subject: &str) -> Self {
        self.claim("sub", subject)
    }

    /// Set the `aud` claim.
    pub fn audience(self, audience: &str) -> Self {
        self.claim("aud", audience)
    }

    /// Add a scope to the `scope` claim.
    pub fn scope(mut self, scope: &str) -> Self {
        self.scopes.push(scope.to_string());
        self
    }

    /// Set an arbitrary claim.
    pub fn claim(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.claims.insert(name.to_string(), value.into());
        self
    }

    /// Set the `exp` claim to `secs` seconds from now. Negative values
    /// produce an already-expired token.
    pub fn expires_in(self, secs: i64) -> Self {
        self.claim("exp", unix_now() + secs)
    }

    /// Sign the token and return the compact JWS serialization.
    pub fn build(mut self) -> String {
        if !self.scopes.is_empty() {
            self.claims
                .insert("scope".to_string(), Value::String(self.scopes.join(" ")));
        }
        self.claims
            .entry("exp".to_string())
            .or_insert_with(|| Value::from(unix_now() + 3600));

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.signer.kid.clone());

        encode(&header, &self.claims, &self.signer.encoding_key)
            .expect("failed to sign test token")
    }
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn minted_token_validates_against_own_key() {
        let signer = TestSigner::new();
        let validator = signer.validator(ResourceConfig::new("rob"));

        let token = signer
            .token()
            .issuer("rob")
            .subject("alice")
            .scope("message.read")
            .scope("message.write")
            .build();

        let bearer = validator.validate(&token).await.unwrap();
        assert_eq!(bearer.subject(), Some("alice"));
        assert!(bearer.has_scope("message.read"));
        assert!(bearer.has_scope("message.write"));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let signer = TestSigner::new();
        let validator = signer.validator(ResourceConfig::new("rob"));

        let token = signer.token().issuer("rob").expires_in(-60).build();
        assert!(validator.validate(&token).await.is_err());
    }

    #[tokio::test]
    async fn token_from_another_signer_is_rejected() {
        let signer = TestSigner::new();
        let other = TestSigner::new();
        let validator = signer.validator(ResourceConfig::new("rob"));

        let token = other.token().issuer("rob").build();
        assert!(validator.validate(&token).await.is_err());
    }
}
