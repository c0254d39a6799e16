use axum::routing::{get, post};
use axum::{middleware, Router};
use resguard::csrf_protection;
use tower_http::trace::TraceLayer;

use crate::controllers::messages::{create_message, get_message};
use crate::state::AppState;

/// Assemble the messages router. Shared between `main` and the integration
/// tests.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/messages/{id}", get(get_message))
        .route("/messages", post(create_message))
        .layer(middleware::from_fn(csrf_protection))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
