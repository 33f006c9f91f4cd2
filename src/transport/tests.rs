use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;
use tungstenite::protocol::Message as WsMessage;

use super::message::{ClientFrame, ServerFrame};
use super::websocket::handle_frame;
use crate::broker::TopicBroker;
use crate::broker::message::{ChatMessage, MessageKind};
use crate::chat::{ChatService, PUBLIC_TOPIC};
use crate::session::SessionRegistry;

fn service() -> (Arc<TopicBroker>, Arc<ChatService>) {
    let broker = Arc::new(TopicBroker::new());
    let registry = Arc::new(SessionRegistry::new(broker.clone()));
    let service = Arc::new(ChatService::new(registry, broker.clone()));
    (broker, service)
}

fn frame(value: serde_json::Value) -> ClientFrame {
    serde_json::from_value(value).expect("valid client frame")
}

#[test]
fn join_frame_dispatches_to_the_service() {
    let (broker, service) = service();
    let session = "session-1".to_string();
    service.registry().register(&session).unwrap();

    let reply = handle_frame(
        &service,
        &session,
        frame(json!({
            "type": "join",
            "message": { "sender": "alice", "type": "JOIN" }
        })),
    );

    assert!(reply.is_none());
    assert_eq!(
        service.registry().display_name(&session),
        Some("alice".to_string())
    );
    assert!(broker.is_subscribed(PUBLIC_TOPIC, &session));
}

#[test]
fn send_frame_relays_to_the_room() {
    let (broker, service) = service();
    let session = "session-1".to_string();
    service.registry().register(&session).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
    broker.attach(session.clone(), tx);

    handle_frame(
        &service,
        &session,
        frame(json!({
            "type": "join",
            "message": { "sender": "alice", "type": "JOIN" }
        })),
    );
    rx.try_recv().unwrap(); // the join announcement

    let reply = handle_frame(
        &service,
        &session,
        frame(json!({
            "type": "send",
            "message": { "sender": "alice", "type": "CHAT", "content": "hello" }
        })),
    );
    assert!(reply.is_none());

    let relayed = rx.try_recv().unwrap();
    if let WsMessage::Text(text) = relayed {
        let msg: ChatMessage = serde_json::from_str(&text).unwrap();
        assert_eq!(msg.kind, MessageKind::Chat);
        assert_eq!(msg.content, "hello");
        assert!(msg.timestamp.is_some());
    } else {
        panic!("Expected a text message");
    }
}

#[test]
fn rejected_send_is_answered_with_an_error_frame() {
    let (_, service) = service();
    let session = "session-1".to_string();

    let reply = handle_frame(
        &service,
        &session,
        frame(json!({
            "type": "send",
            "message": { "sender": "alice", "type": "CHAT", "content": "" }
        })),
    );

    assert!(matches!(reply, Some(ServerFrame::Error { .. })));
}

#[test]
fn subscribe_and_unsubscribe_frames_manage_topic_membership() {
    let (broker, service) = service();
    let session = "session-1".to_string();

    let reply = handle_frame(
        &service,
        &session,
        frame(json!({ "type": "subscribe", "topic": "ops" })),
    );
    assert!(reply.is_none());
    assert!(broker.is_subscribed("ops", &session));

    let reply = handle_frame(
        &service,
        &session,
        frame(json!({ "type": "unsubscribe", "topic": "ops" })),
    );
    assert!(reply.is_none());
    assert!(!broker.is_subscribed("ops", &session));
}

#[test]
fn unknown_frame_types_do_not_parse() {
    let raw = r#"{ "type": "publish", "topic": "lobby", "payload": "hi" }"#;
    assert!(serde_json::from_str::<ClientFrame>(raw).is_err());
}
