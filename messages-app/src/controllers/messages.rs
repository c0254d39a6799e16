use axum::extract::{Path, State};
use axum::Json;
use resguard::{BearerToken, RequiredScopes};
use tracing::info;

use crate::error::ApiError;
use crate::models::{Message, NewMessage};
use crate::store::MessageStore;

/// GET /messages/{id} — requires the `message.read` scope.
pub async fn get_message(
    State(store): State<MessageStore>,
    token: BearerToken,
    Path(id): Path<u64>,
) -> Result<Json<Message>, ApiError> {
    RequiredScopes::any(["message.read"]).check(&token)?;

    let message = store.get(id).await.ok_or(ApiError::NotFound(id))?;
    Ok(Json(message))
}

/// POST /messages — requires the `message.write` scope.
pub async fn create_message(
    State(store): State<MessageStore>,
    token: BearerToken,
    Json(payload): Json<NewMessage>,
) -> Result<Json<Message>, ApiError> {
    RequiredScopes::any(["message.write"]).check(&token)?;

    let message = store.insert(payload.text).await;
    info!(
        id = message.id,
        sub = token.subject().unwrap_or("unknown"),
        "Created message"
    );
    Ok(Json(message))
}
