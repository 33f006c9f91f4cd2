use std::collections::HashSet;

use crate::session::SessionId;

/// A named broadcast destination and the set of sessions subscribed to it.
///
/// Subscriber uniqueness is enforced by the backing `HashSet`; a session is a
/// member of a topic at most once and iteration order carries no meaning.
#[derive(Debug, Default)]
pub struct Topic {
    pub name: String,
    pub subscribers: HashSet<SessionId>,
}

impl Topic {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: HashSet::new(),
        }
    }

    /// Adds a session to the topic. Subscribing twice has no effect.
    pub fn subscribe(&mut self, id: SessionId) {
        self.subscribers.insert(id);
    }

    /// Removes a session from the topic. Unknown sessions are a no-op.
    pub fn unsubscribe(&mut self, id: &SessionId) {
        self.subscribers.remove(id);
    }
}
