//! WebSocket transport
//!
//! Bridges WebSocket connections onto the relay core:
//! - accepts connections and assigns each one an opaque session id
//! - registers the session and attaches its outbound channel to the broker
//! - decodes JSON frames and dispatches them to the chat service
//! - announces the leave and removes the session when either loop ends
//!
//! All payload decoding happens here; the core only ever sees typed
//! `ChatMessage` values. Cleanup is guarded so that the receive loop and the
//! send loop can both observe the disconnect without removing the session
//! twice.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::spawn;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tracing::{error, info, warn};
use tungstenite::protocol::Message as WsMessage;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::chat::ChatService;
use crate::config::Settings;
use crate::session::SessionId;
use crate::transport::message::{ClientFrame, ServerFrame};

pub async fn start_websocket_server(addr: String, service: Arc<ChatService>, settings: Settings) {
    let listener = TcpListener::bind(addr.clone()).await.expect("Can't bind");

    info!("WebSocket relay listening on ws://{addr}");

    while let Ok((stream, _)) = listener.accept().await {
        let service = service.clone();
        let max_connections = settings.broker.max_connections;

        spawn(async move {
            let mut ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    error!("WebSocket handshake error: {e}");
                    return;
                }
            };

            if service.registry().count() >= max_connections {
                warn!("connection limit of {max_connections} reached, refusing connection");
                let _ = ws_stream.close(None).await;
                return;
            }

            let session_id: SessionId = format!("session-{}", uuid::Uuid::new_v4());
            let (mut ws_sender, mut ws_receiver) = ws_stream.split();
            let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

            if let Err(e) = service.registry().register(&session_id) {
                error!("failed to register {session_id}: {e}");
                return;
            }
            service.broker().attach(session_id.clone(), tx.clone());

            let cleanup_called = Arc::new(AtomicBool::new(false));

            let do_cleanup = {
                let service = service.clone();
                let session_id = session_id.clone();
                let cleanup_called = cleanup_called.clone();

                move || {
                    if !cleanup_called.swap(true, Ordering::SeqCst) {
                        let _ = service.announce_leave(&session_id);
                        service.registry().remove(&session_id);
                    }
                }
            };

            {
                let session_id = session_id.clone();
                let do_cleanup = do_cleanup.clone();

                spawn(async move {
                    while let Some(msg) = rx.recv().await {
                        if let Err(e) = ws_sender.send(msg).await {
                            warn!("failed to send message to {session_id}: {e}");
                            break;
                        }
                    }

                    do_cleanup();
                    info!("send loop closed for {session_id}");
                });
            }

            info!("{session_id} connected");

            while let Some(Ok(msg)) = ws_receiver.next().await {
                if !msg.is_text() {
                    continue;
                }
                let text = msg.to_text().unwrap();

                match serde_json::from_str::<ClientFrame>(text) {
                    Ok(frame) => {
                        if let Some(reply) = handle_frame(&service, &session_id, frame) {
                            if let Ok(json) = serde_json::to_string(&reply) {
                                let _ = tx.send(WsMessage::text(json));
                            }
                        }
                    }
                    Err(err) => {
                        warn!(
                            "invalid frame from {session_id}: {err} | {}",
                            text.chars().take(100).collect::<String>()
                        );
                    }
                }
            }

            info!("{session_id} disconnected");
            do_cleanup();
        });
    }
}

/// Dispatches one decoded frame. Returns the reply frame owed to the
/// originating client, if any; broadcast traffic goes out through the
/// broker, not through the return value.
pub(crate) fn handle_frame(
    service: &ChatService,
    session_id: &SessionId,
    frame: ClientFrame,
) -> Option<ServerFrame> {
    match frame {
        ClientFrame::Join { message } => match service.handle_join(session_id, message) {
            Ok(_) => None,
            Err(e) => {
                warn!("join rejected for {session_id}: {e}");
                Some(ServerFrame::Error {
                    message: e.to_string(),
                })
            }
        },
        ClientFrame::Send { message } => match service.handle_send(session_id, message) {
            Ok(_) => None,
            Err(e) => {
                warn!("send rejected for {session_id}: {e}");
                Some(ServerFrame::Error {
                    message: e.to_string(),
                })
            }
        },
        ClientFrame::Subscribe { topic } => {
            service.broker().subscribe(&topic, session_id.clone());
            info!("{session_id} subscribed to {topic}");
            None
        }
        ClientFrame::Unsubscribe { topic } => {
            service.broker().unsubscribe(&topic, session_id);
            info!("{session_id} unsubscribed from {topic}");
            None
        }
    }
}
