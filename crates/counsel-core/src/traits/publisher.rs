//! Notification and health ports

use async_trait::async_trait;

use super::RepoResult;
use crate::events::DomainEvent;

/// Fan-out of committed domain events. Delivery is best effort.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &DomainEvent) -> RepoResult<()>;
}

/// A dependency the readiness endpoint reports on
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    fn name(&self) -> &'static str;

    async fn check(&self) -> RepoResult<()>;
}
