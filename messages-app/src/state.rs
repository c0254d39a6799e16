use std::sync::Arc;

use axum::extract::FromRef;
use resguard::TokenValidator;

use crate::store::MessageStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<TokenValidator>,
    pub store: MessageStore,
}

impl AppState {
    pub fn new(validator: Arc<TokenValidator>) -> Self {
        Self {
            validator,
            store: MessageStore::new(),
        }
    }
}

impl FromRef<AppState> for Arc<TokenValidator> {
    fn from_ref(state: &AppState) -> Self {
        state.validator.clone()
    }
}

impl FromRef<AppState> for MessageStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}
