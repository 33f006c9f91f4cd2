//! Broker engine
//!
//! The in-memory topic broker is responsible for:
//! - managing topics and their subscriber sets
//! - fanning a published message out to every subscriber's outbound channel
//! - purging a session from all topics when it goes away
//!
//! Concurrency notes:
//! - The topic map and the outbound channel map are each guarded by their own
//!   `RwLock`. `publish` snapshots the subscriber set under the read side and
//!   releases the lock before delivering, so subscribe/unsubscribe calls that
//!   race with a broadcast can never invalidate the scan; a subscription
//!   landing exactly at publish time may or may not be included.
//! - Outbound channels are unbounded and sending never blocks, so one slow
//!   WebSocket peer cannot stall delivery to the remaining subscribers. A
//!   failed send is recorded in the `DeliveryReport` and the scan continues.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::message::ChatMessage;
use crate::broker::topic::Topic;
use crate::session::SessionId;

/// Outcome of one `publish` call: how many subscribers the message reached
/// and which ones it could not be handed to.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: Vec<SessionId>,
}

impl DeliveryReport {
    /// Total number of subscribers the broadcast attempted.
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed.len()
    }
}

/// The broker owning every topic's subscriber set and the outbound channel
/// of each attached session. All methods take `&self`; the broker is meant
/// to be shared between connection tasks behind an `Arc`.
#[derive(Debug, Default)]
pub struct TopicBroker {
    topics: RwLock<HashMap<String, Topic>>,
    outbound: RwLock<HashMap<SessionId, UnboundedSender<WsMessage>>>,
}

impl TopicBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates a session with its outbound channel. Called by the
    /// transport once the connection is up; publishing to a session that was
    /// never attached counts as a failed delivery.
    pub fn attach(&self, id: SessionId, sender: UnboundedSender<WsMessage>) {
        self.outbound.write().unwrap().insert(id, sender);
    }

    /// Drops a session's outbound channel without touching its subscriptions.
    pub fn detach(&self, id: &SessionId) {
        self.outbound.write().unwrap().remove(id);
    }

    /// Subscribes a session to a topic, creating the topic on first use.
    /// Subscribing twice has no effect.
    pub fn subscribe(&self, topic: &str, subscriber: SessionId) {
        self.topics
            .write()
            .unwrap()
            .entry(topic.to_string())
            .or_insert_with(|| Topic::new(topic))
            .subscribe(subscriber);
    }

    /// Unsubscribes a session from a topic. Unknown topics and sessions are
    /// a no-op.
    pub fn unsubscribe(&self, topic: &str, subscriber: &SessionId) {
        if let Some(t) = self.topics.write().unwrap().get_mut(topic) {
            t.unsubscribe(subscriber);
        }
    }

    /// Removes a session from every topic and drops its outbound channel.
    /// The session registry calls this when a session is removed, so no
    /// subscriber set can hold an id that no longer resolves to a session.
    pub fn purge_session(&self, id: &SessionId) {
        {
            let mut topics = self.topics.write().unwrap();
            for topic in topics.values_mut() {
                topic.unsubscribe(id);
            }
        }
        self.detach(id);
        debug!("purged session {id} from all topics");
    }

    /// Delivers `msg` to every current subscriber of `topic`.
    ///
    /// The subscriber set present at the start of the scan is the delivery
    /// target; every member is attempted exactly once. A delivery that fails
    /// (closed or never-attached channel) is recorded and does not abort
    /// delivery to the remaining subscribers. Publishing to a topic with no
    /// subscribers trivially succeeds with an empty report.
    pub fn publish(&self, topic: &str, msg: &ChatMessage) -> DeliveryReport {
        let targets: Vec<SessionId> = match self.topics.read().unwrap().get(topic) {
            Some(t) => t.subscribers.iter().cloned().collect(),
            None => Vec::new(),
        };

        let mut report = DeliveryReport::default();
        if targets.is_empty() {
            return report;
        }

        let text = match serde_json::to_string(msg) {
            Ok(json) => json,
            Err(e) => {
                error!("failed to serialize message for topic {topic}: {e}");
                report.failed = targets;
                return report;
            }
        };
        let ws_msg = WsMessage::text(text);

        let outbound = self.outbound.read().unwrap();
        for id in targets {
            let Some(sender) = outbound.get(&id) else {
                warn!("no outbound channel for session {id}");
                report.failed.push(id);
                continue;
            };
            if let Err(e) = sender.send(ws_msg.clone()) {
                warn!("failed to send to {id}: {e}");
                report.failed.push(id);
            } else {
                report.delivered += 1;
            }
        }
        report
    }

    /// True if `id` is currently subscribed to `topic`.
    pub fn is_subscribed(&self, topic: &str, id: &SessionId) -> bool {
        self.topics
            .read()
            .unwrap()
            .get(topic)
            .is_some_and(|t| t.subscribers.contains(id))
    }

    /// Number of sessions currently subscribed to `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .unwrap()
            .get(topic)
            .map_or(0, |t| t.subscribers.len())
    }
}
