use std::sync::Arc;

use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use resguard::{JwksCache, TokenValidator};
use tracing_subscriber::EnvFilter;

use messages_app::{router, AppConfig, AppState};

fn dev_token(secret: &[u8], issuer: &str, scope: &str) -> String {
    let exp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + 3600;

    let claims = serde_json::json!({
        "sub": "dev-user",
        "iss": issuer,
        "scope": scope,
        "exp": exp,
    });

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .unwrap()
}

async fn build_validator(config: &AppConfig) -> Arc<TokenValidator> {
    match &config.jwks_url {
        Some(url) => {
            tracing::info!(jwks_url = %url, "Validating tokens against remote JWKS");
            let resource_config = config.resource_config();
            let jwks = JwksCache::new(resource_config.clone())
                .await
                .expect("failed to fetch initial JWKS");
            Arc::new(TokenValidator::new(Arc::new(jwks), resource_config))
        }
        None => {
            let secret = config.dev_secret.as_bytes();
            let resource_config = config
                .resource_config()
                .with_allowed_algorithms([Algorithm::HS256]);

            // Print ready-to-curl tokens for local experiments.
            println!("=== Dev tokens (valid 1h) ===");
            for scope in ["message.read", "message.write", "message.read message.write"] {
                println!("[{scope}]");
                println!("{}", dev_token(secret, &config.issuer, scope));
                println!();
            }

            Arc::new(TokenValidator::new_with_static_key(
                DecodingKey::from_secret(secret),
                resource_config,
            ))
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".parse().unwrap()),
        )
        .init();

    let config = AppConfig::from_env();
    let validator = build_validator(&config).await;
    let app = router(AppState::new(validator));

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.addr));

    tracing::info!(addr = %config.addr, issuer = %config.issuer, "messages-app listening");
    axum::serve(listener, app).await.expect("server error");
}
