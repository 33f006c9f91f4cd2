pub mod engine;
pub mod message;
pub mod topic;

pub use engine::{DeliveryReport, TopicBroker};
