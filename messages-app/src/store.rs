use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::Message;

/// In-memory message store, seeded with one well-known message.
#[derive(Clone)]
pub struct MessageStore {
    messages: Arc<RwLock<Vec<Message>>>,
    next_id: Arc<AtomicU64>,
}

impl MessageStore {
    pub fn new() -> Self {
        let seed = vec![Message {
            id: 1,
            text: "Hello World".into(),
        }];
        Self {
            messages: Arc::new(RwLock::new(seed)),
            next_id: Arc::new(AtomicU64::new(2)),
        }
    }

    pub async fn get(&self, id: u64) -> Option<Message> {
        self.messages
            .read()
            .await
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    pub async fn insert(&self, text: String) -> Message {
        let message = Message {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            text,
        };
        self.messages.write().await.push(message.clone());
        message
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}
