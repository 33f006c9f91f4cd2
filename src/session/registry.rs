//! Session registry
//!
//! Tracks every live connection and the display name it picked when it
//! joined. A session passes through three states: registered with no name,
//! named after a successful join, and gone after `remove`. Removal also
//! purges the session from every topic through the broker, so a subscriber
//! set can never outlive the session it refers to.
//!
//! The registry is internally synchronized; all methods take `&self` and
//! their effects are visible to the next caller on any thread.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, RwLock};

use tracing::info;

use crate::broker::TopicBroker;
use crate::utils::error::RelayError;

/// Opaque connection identifier, assigned by the transport layer.
pub type SessionId = String;

/// Presence data for one connection.
#[derive(Debug, Default)]
pub struct Session {
    pub display_name: Option<String>,
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Session>>,
    broker: Arc<TopicBroker>,
}

impl SessionRegistry {
    pub fn new(broker: Arc<TopicBroker>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            broker,
        }
    }

    /// Creates a session that has not joined yet.
    pub fn register(&self, id: &SessionId) -> Result<(), RelayError> {
        match self.sessions.write().unwrap().entry(id.clone()) {
            Entry::Occupied(_) => Err(RelayError::DuplicateSession(id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(Session::default());
                Ok(())
            }
        }
    }

    /// Records the name a session joined under. Joining again overwrites the
    /// previous name, matching the permissive join protocol.
    pub fn set_display_name(&self, id: &SessionId, name: &str) -> Result<(), RelayError> {
        if name.is_empty() {
            return Err(RelayError::InvalidName(name.to_string()));
        }
        match self.sessions.write().unwrap().get_mut(id) {
            Some(session) => {
                session.display_name = Some(name.to_string());
                Ok(())
            }
            None => Err(RelayError::UnknownSession(id.clone())),
        }
    }

    pub fn display_name(&self, id: &SessionId) -> Option<String> {
        self.sessions
            .read()
            .unwrap()
            .get(id)
            .and_then(|s| s.display_name.clone())
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.read().unwrap().contains_key(id)
    }

    /// Number of live sessions.
    pub fn count(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    /// Destroys a session. Safe to call for ids that are already gone; the
    /// broker purge runs either way, so a session id can never linger in a
    /// subscriber set after removal.
    pub fn remove(&self, id: &SessionId) {
        let removed = self.sessions.write().unwrap().remove(id);
        self.broker.purge_session(id);
        if removed.is_some() {
            info!("session {id} removed");
        }
    }
}
