//! # counsel-cache
//!
//! Redis side of the service: a deadpool connection pool and a pub/sub
//! [`Publisher`] that implements the `EventPublisher` port, so committed
//! consultation events reach other instances and subscribed clients.
//!
//! ## Example
//!
//! ```ignore
//! use counsel_cache::{Publisher, RedisPool, RedisPoolConfig};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let publisher = Publisher::new(pool.clone());
//! // hand `publisher` to the service context as its EventPublisher
//! ```

pub mod pool;
pub mod pubsub;

pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};
pub use pubsub::{
    channels_for, PubSubChannel, PubSubEvent, Publisher, CONSULTATION_CHANNEL_PREFIX,
    USER_CHANNEL_PREFIX,
};
