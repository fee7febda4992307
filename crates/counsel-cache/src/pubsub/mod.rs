//! Redis Pub/Sub fan-out of domain events

mod channels;
mod publisher;

pub use channels::{PubSubChannel, CONSULTATION_CHANNEL_PREFIX, USER_CHANNEL_PREFIX};
pub use publisher::{channels_for, PubSubEvent, Publisher};
