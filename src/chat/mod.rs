pub mod service;

pub use service::{ChatService, PUBLIC_TOPIC};
