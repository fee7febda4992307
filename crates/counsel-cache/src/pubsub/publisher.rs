//! Redis Pub/Sub publisher.
//!
//! Every committed domain event goes to its consultation's channel and to the
//! personal channel of each participant, wrapped in a small envelope.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use counsel_core::error::DomainError;
use counsel_core::traits::{EventPublisher, RepoResult};
use counsel_core::DomainEvent;

use crate::pool::{RedisPool, RedisResult};
use crate::pubsub::PubSubChannel;

/// Wire format of a published event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubSubEvent {
    /// Event type name (e.g. `MESSAGE_CREATED`)
    pub event_type: String,
    pub data: serde_json::Value,
    pub published_at: DateTime<Utc>,
}

impl PubSubEvent {
    pub fn from_domain(event: &DomainEvent) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_type: event.event_type().to_string(),
            data: serde_json::to_value(event)?,
            published_at: Utc::now(),
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Channels an event is delivered to
pub fn channels_for(event: &DomainEvent) -> Vec<PubSubChannel> {
    std::iter::once(PubSubChannel::consultation(event.consultation_id()))
        .chain(event.recipients().into_iter().map(PubSubChannel::user))
        .collect()
}

/// Redis Pub/Sub publisher
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish to multiple channels over one connection.
    /// Returns how many subscribers received it in total.
    pub async fn publish_many(
        &self,
        channels: &[PubSubChannel],
        event: &PubSubEvent,
    ) -> RedisResult<u32> {
        let payload = event.to_json()?;
        let mut total_receivers = 0;
        let mut conn = self.pool.get().await?;

        for channel in channels {
            let receivers: u32 = conn.publish(channel.name(), &payload).await?;
            total_receivers += receivers;
        }

        tracing::debug!(
            channels = channels.len(),
            event_type = %event.event_type,
            total_receivers = total_receivers,
            "Published event"
        );

        Ok(total_receivers)
    }
}

#[async_trait]
impl EventPublisher for Publisher {
    async fn publish(&self, event: &DomainEvent) -> RepoResult<()> {
        let envelope = PubSubEvent::from_domain(event)
            .map_err(|e| DomainError::CacheError(e.to_string()))?;
        self.publish_many(&channels_for(event), &envelope).await?;
        Ok(())
    }
}
