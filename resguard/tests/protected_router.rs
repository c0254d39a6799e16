use std::sync::Arc;

use axum::body::Body;
use axum::extract::FromRef;
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{Method, Request, StatusCode};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use tower::util::ServiceExt;

use resguard::{csrf_protection, BearerToken, RequiredScopes, ResourceConfig, TokenValidator};

const SECRET: &[u8] = b"protected-router-test-secret";

#[derive(Clone)]
struct TestState {
    validator: Arc<TokenValidator>,
}

impl FromRef<TestState> for Arc<TokenValidator> {
    fn from_ref(state: &TestState) -> Self {
        state.validator.clone()
    }
}

async fn read_handler(token: BearerToken) -> Result<Json<serde_json::Value>, resguard::AuthError> {
    RequiredScopes::any(["thing.read"]).check(&token)?;
    Ok(Json(serde_json::json!({ "sub": token.subject() })))
}

async fn write_handler(token: BearerToken) -> Result<Json<serde_json::Value>, resguard::AuthError> {
    RequiredScopes::any(["thing.write"]).check(&token)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

fn app() -> Router {
    let config = ResourceConfig::new("test-issuer").with_allowed_algorithms([Algorithm::HS256]);
    let state = TestState {
        validator: Arc::new(TokenValidator::new_with_static_key(
            DecodingKey::from_secret(SECRET),
            config,
        )),
    };

    Router::new()
        .route("/things", get(read_handler))
        .route("/things", post(write_handler))
        .layer(middleware::from_fn(csrf_protection))
        .with_state(state)
}

fn token(scope: &str) -> String {
    let exp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + 3600;
    encode(
        &Header::new(Algorithm::HS256),
        &serde_json::json!({ "iss": "test-issuer", "sub": "rob", "scope": scope, "exp": exp }),
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap()
}

async fn send(method: Method, auth: Option<&str>) -> (StatusCode, Option<String>) {
    let mut builder = Request::builder().method(method).uri("/things");
    if let Some(value) = auth {
        builder = builder.header(AUTHORIZATION, value);
    }

    let response = app()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let challenge = response
        .headers()
        .get(WWW_AUTHENTICATE)
        .map(|v| v.to_str().unwrap().to_string());
    (response.status(), challenge)
}

#[tokio::test]
async fn read_scope_reaches_handler() {
    let auth = format!("Bearer {}", token("thing.read"));
    let (status, _) = send(Method::GET, Some(&auth)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_token_is_challenged() {
    let (status, challenge) = send(Method::GET, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(challenge.as_deref(), Some("Bearer"));
}

#[tokio::test]
async fn unauthenticated_write_is_blocked_before_handler() {
    let (status, challenge) = send(Method::POST, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(challenge.as_deref(), Some("Bearer"));
}

#[tokio::test]
async fn wrong_scope_gets_full_challenge() {
    let auth = format!("Bearer {}", token("thing.write"));
    let (status, challenge) = send(Method::GET, Some(&auth)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let challenge = challenge.unwrap();
    assert!(challenge.contains("error=\"insufficient_scope\""));
    assert!(challenge.contains("scope=\"thing.read\""));
}

#[tokio::test]
async fn non_bearer_scheme_counts_as_missing() {
    let (status, challenge) = send(Method::GET, Some("Basic dXNlcjpwYXNz")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(challenge.as_deref(), Some("Bearer"));
}

#[tokio::test]
async fn malformed_credential_is_bad_request() {
    let (status, challenge) = send(Method::GET, Some("Bearer a\"malformed\"token")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(challenge.unwrap().contains("error=\"invalid_request\""));
}

#[tokio::test]
async fn tampered_token_is_unauthorized() {
    let mut credential = token("thing.read");
    credential.pop();
    let auth = format!("Bearer {credential}");
    let (status, challenge) = send(Method::GET, Some(&auth)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(challenge.unwrap().contains("error=\"invalid_token\""));
}
