//! # ChatRelay
//!
//! `chatrelay` is a minimalist, in-process publish/subscribe chat relay built
//! with Rust. Clients connect over WebSockets, join a shared room under a
//! display name, and every chat or presence message is fanned out to the
//! room's current subscribers.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `broker`: topic bookkeeping and message fan-out to subscriber channels.
//! - `session`: the registry of live connections and their display names.
//! - `chat`: the chat service combining registry and broker for the join/send/leave operations.
//! - `config`: loading and merging of server configuration.
//! - `transport`: the WebSocket server bridging connections onto the core.
//! - `utils`: shared utilities, such as error types and logging setup.

pub mod broker;
pub mod chat;
pub mod config;
pub mod session;
pub mod transport;
pub mod utils;
