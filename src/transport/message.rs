use serde::{Deserialize, Serialize};

use crate::broker::message::ChatMessage;

/// Frames a client may send. `join` and `send` carry the chat message
/// payload; `subscribe`/`unsubscribe` manage extra topic membership
/// directly.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientFrame {
    #[serde(rename = "join")]
    Join { message: ChatMessage },

    #[serde(rename = "send")]
    Send { message: ChatMessage },

    #[serde(rename = "subscribe")]
    Subscribe { topic: String },

    #[serde(rename = "unsubscribe")]
    Unsubscribe { topic: String },
}

/// Frames the server sends back to the originating client only. Broadcast
/// traffic is the bare `ChatMessage` JSON, not wrapped in a frame.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerFrame {
    #[serde(rename = "error")]
    Error { message: String },
}
