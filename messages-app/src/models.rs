use serde::{Deserialize, Serialize};

/// A stored message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub text: String,
}

/// Payload for creating a message.
#[derive(Debug, Serialize, Deserialize)]
pub struct NewMessage {
    pub text: String,
}
