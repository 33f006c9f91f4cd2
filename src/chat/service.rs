//! Chat service
//!
//! The protocol entry points (`handle_send`, `handle_join`) plus the leave
//! broadcast emitted when a named session disconnects. The service validates
//! and enriches inbound messages, keeps the registry in step, and hands the
//! result to the broker for fan-out.
//!
//! Sending is allowed before joining; the relay does not force a join-first
//! protocol, it only requires one for the session to have a display name.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::broker::TopicBroker;
use crate::broker::message::{ChatMessage, MessageKind};
use crate::session::{SessionId, SessionRegistry};
use crate::utils::error::RelayError;

/// The shared room every chat and presence message is relayed through.
pub const PUBLIC_TOPIC: &str = "public";

pub struct ChatService {
    registry: Arc<SessionRegistry>,
    broker: Arc<TopicBroker>,
}

impl ChatService {
    pub fn new(registry: Arc<SessionRegistry>, broker: Arc<TopicBroker>) -> Self {
        Self { registry, broker }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn broker(&self) -> &TopicBroker {
        &self.broker
    }

    /// Relays a chat message to everyone in the public room.
    ///
    /// A missing timestamp is filled in with the arrival time; a timestamp
    /// supplied by the caller passes through untouched. The enriched message
    /// is returned so the transport can echo it.
    pub fn handle_send(
        &self,
        session_id: &SessionId,
        mut message: ChatMessage,
    ) -> Result<ChatMessage, RelayError> {
        if message.kind != MessageKind::Chat {
            return Err(RelayError::InvalidMessage(format!(
                "expected a CHAT message, got {:?}",
                message.kind
            )));
        }
        if message.content.is_empty() {
            return Err(RelayError::InvalidMessage(
                "chat message body is empty".to_string(),
            ));
        }
        stamp(&mut message);

        let report = self.broker.publish(PUBLIC_TOPIC, &message);
        debug!(
            "session {session_id} sent a chat message, delivered to {} subscriber(s)",
            report.delivered
        );
        Ok(message)
    }

    /// Handles a join: records the display name, subscribes the session to
    /// the public room and announces the arrival there.
    ///
    /// A join from a session the transport never registered registers it on
    /// the fly; the join protocol is permissive about ordering.
    pub fn handle_join(
        &self,
        session_id: &SessionId,
        mut message: ChatMessage,
    ) -> Result<ChatMessage, RelayError> {
        if message.kind != MessageKind::Join {
            return Err(RelayError::InvalidMessage(format!(
                "expected a JOIN message, got {:?}",
                message.kind
            )));
        }
        if message.sender.is_empty() {
            return Err(RelayError::InvalidName(message.sender.clone()));
        }

        match self.registry.set_display_name(session_id, &message.sender) {
            Ok(()) => {}
            Err(RelayError::UnknownSession(_)) => {
                self.registry.register(session_id)?;
                self.registry.set_display_name(session_id, &message.sender)?;
            }
            Err(e) => return Err(e),
        }

        self.broker.subscribe(PUBLIC_TOPIC, session_id.clone());
        stamp(&mut message);
        self.broker.publish(PUBLIC_TOPIC, &message);
        info!("session {session_id} joined as {}", message.sender);
        Ok(message)
    }

    /// Announces that a named session left the room. Sessions that never
    /// joined disconnect without a broadcast. Returns the message that went
    /// out, if any.
    pub fn announce_leave(&self, session_id: &SessionId) -> Option<ChatMessage> {
        let name = self.registry.display_name(session_id)?;
        let mut message = ChatMessage {
            sender: name,
            kind: MessageKind::Leave,
            content: String::new(),
            timestamp: None,
        };
        stamp(&mut message);
        self.broker.publish(PUBLIC_TOPIC, &message);
        info!("session {session_id} left as {}", message.sender);
        Some(message)
    }
}

/// Fills in the current time when the message arrived without one.
fn stamp(message: &mut ChatMessage) {
    if message.timestamp.is_none() {
        message.timestamp = Some(Utc::now().to_rfc3339());
    }
}
