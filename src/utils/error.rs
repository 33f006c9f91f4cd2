//! Error types for the relay core.
//!
//! All variants are local validation failures reported to the immediate
//! caller, usually the transport. Per-subscriber delivery failures are not
//! errors; the broker records those in its `DeliveryReport` instead, since
//! one unreachable subscriber must not fail a broadcast for everyone else.

use thiserror::Error;

use crate::session::SessionId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("session {0} is already registered")]
    DuplicateSession(SessionId),
    #[error("unknown session {0}")]
    UnknownSession(SessionId),
    #[error("invalid display name {0:?}")]
    InvalidName(String),
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
