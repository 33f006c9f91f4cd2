use serde::{Deserialize, Serialize};

/// Discriminant carried on every relayed message. `Join` and `Leave` are
/// presence announcements; `Chat` carries user text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageKind {
    Chat,
    Join,
    Leave,
}

/// A single chat or presence message relayed through the broker.
///
/// Wire shape: `{ "sender": ..., "type": "CHAT" | "JOIN" | "LEAVE",
/// "content": ..., "timestamp": ... }`, with the timestamp key omitted
/// entirely while it has not been assigned. The content may be empty for
/// presence messages. Once a message has been handed to the broker it is
/// never mutated again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}
