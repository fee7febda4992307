//! In-process event publishers
//!
//! [`NoopPublisher`] is used when Redis is not configured. [`BroadcastPublisher`]
//! hands events to in-process subscribers over a tokio broadcast channel.

use async_trait::async_trait;
use tokio::sync::broadcast;

use counsel_core::traits::{EventPublisher, RepoResult};
use counsel_core::DomainEvent;

/// Drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, _event: &DomainEvent) -> RepoResult<()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<DomainEvent>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl EventPublisher for BroadcastPublisher {
    async fn publish(&self, event: &DomainEvent) -> RepoResult<()> {
        // No subscribers is not an error
        let _ = self.sender.send(event.clone());
        Ok(())
    }
}
