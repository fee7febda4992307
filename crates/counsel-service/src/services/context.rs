//! Service context - dependency container for services
//!
//! Holds the repository ports, the event publisher, the id generator and the
//! message limits. Services borrow it for the duration of one call.

use std::sync::Arc;

use counsel_cache::{Publisher, RedisPool};
use counsel_core::entities::MessageLimits;
use counsel_core::traits::{
    ConsultationRepository, EventPublisher, MessageRepository, ParticipantRepository,
};
use counsel_core::{DomainEvent, Snowflake, SnowflakeGenerator};
use counsel_db::{MemoryStore, PgConsultationRepository, PgMessageRepository, PgParticipantRepository, PgPool};
use tracing::warn;

use super::error::{ServiceError, ServiceResult};
use super::events::NoopPublisher;

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    consultation_repo: Arc<dyn ConsultationRepository>,
    message_repo: Arc<dyn MessageRepository>,
    participant_repo: Arc<dyn ParticipantRepository>,

    // Notification
    publisher: Arc<dyn EventPublisher>,

    snowflake_generator: Arc<SnowflakeGenerator>,
    message_limits: MessageLimits,
}

impl ServiceContext {
    pub fn new(
        consultation_repo: Arc<dyn ConsultationRepository>,
        message_repo: Arc<dyn MessageRepository>,
        participant_repo: Arc<dyn ParticipantRepository>,
        publisher: Arc<dyn EventPublisher>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        message_limits: MessageLimits,
    ) -> Self {
        Self {
            consultation_repo,
            message_repo,
            participant_repo,
            publisher,
            snowflake_generator,
            message_limits,
        }
    }

    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    pub fn consultation_repo(&self) -> &dyn ConsultationRepository {
        self.consultation_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn participant_repo(&self) -> &dyn ParticipantRepository {
        self.participant_repo.as_ref()
    }

    // === Notification ===

    pub fn publisher(&self) -> &dyn EventPublisher {
        self.publisher.as_ref()
    }

    /// Fan out a committed event. Failures are logged, never returned:
    /// the change is already durable and clients can re-fetch.
    pub async fn publish(&self, event: DomainEvent) {
        if let Err(e) = self.publisher.publish(&event).await {
            warn!(
                event_type = event.event_type(),
                consultation_id = %event.consultation_id(),
                error = %e,
                "Failed to publish event"
            );
        }
    }

    // === Ids and limits ===

    pub fn snowflake_generator(&self) -> &SnowflakeGenerator {
        self.snowflake_generator.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }

    pub fn message_limits(&self) -> MessageLimits {
        self.message_limits
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("worker_id", &self.snowflake_generator.worker_id())
            .field("message_limits", &self.message_limits)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    consultation_repo: Option<Arc<dyn ConsultationRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    participant_repo: Option<Arc<dyn ParticipantRepository>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    message_limits: MessageLimits,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire all three repositories to PostgreSQL
    pub fn postgres(self, pool: PgPool) -> Self {
        self.consultation_repo(Arc::new(PgConsultationRepository::new(pool.clone())))
            .message_repo(Arc::new(PgMessageRepository::new(pool.clone())))
            .participant_repo(Arc::new(PgParticipantRepository::new(pool)))
    }

    /// Wire all three repositories to an in-memory store
    pub fn memory(self, store: &MemoryStore) -> Self {
        self.consultation_repo(Arc::new(store.consultations()))
            .message_repo(Arc::new(store.messages()))
            .participant_repo(Arc::new(store.participants()))
    }

    /// Publish events over Redis pub/sub
    pub fn redis(self, pool: RedisPool) -> Self {
        self.publisher(Arc::new(Publisher::new(pool)))
    }

    pub fn consultation_repo(mut self, repo: Arc<dyn ConsultationRepository>) -> Self {
        self.consultation_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn participant_repo(mut self, repo: Arc<dyn ParticipantRepository>) -> Self {
        self.participant_repo = Some(repo);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn message_limits(mut self, limits: MessageLimits) -> Self {
        self.message_limits = limits;
        self
    }

    /// Build the ServiceContext. Without a publisher events are dropped;
    /// without a generator worker 0 is used.
    ///
    /// # Errors
    /// Returns `ServiceError::Internal` if a repository is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let missing = |what: &str| ServiceError::internal(format!("{what} is required"));
        Ok(ServiceContext::new(
            self.consultation_repo.ok_or_else(|| missing("consultation_repo"))?,
            self.message_repo.ok_or_else(|| missing("message_repo"))?,
            self.participant_repo.ok_or_else(|| missing("participant_repo"))?,
            self.publisher.unwrap_or_else(|| Arc::new(NoopPublisher)),
            self.snowflake_generator
                .unwrap_or_else(|| Arc::new(SnowflakeGenerator::default())),
            self.message_limits,
        ))
    }
}
