//! Process-local storage backend
//!
//! One mutex guards every consultation and thread so a [`ConsultationChange`]
//! applies all-or-nothing, same as the transaction on the PostgreSQL side.
//! The participant directory is read far more than it is written and lives
//! in its own map.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::instrument;

use counsel_core::entities::{Consultation, ConsultationRecord, Message, Participant};
use counsel_core::error::DomainError;
use counsel_core::traits::{
    ConsultationChange, ConsultationQuery, ConsultationRepository, ConsultationStats,
    MessageRepository, Page, PageRequest, ParticipantRepository, ReadinessProbe, RepoResult, Scope,
};
use counsel_core::value_objects::{ConsultationStatus, Snowflake};

#[derive(Default)]
struct State {
    consultations: HashMap<Snowflake, ConsultationRecord>,
    /// Kept sorted by message id
    threads: HashMap<Snowflake, Vec<Message>>,
    /// message id -> consultation id
    message_index: HashMap<Snowflake, Snowflake>,
}

impl State {
    fn message(&self, id: Snowflake) -> Option<&Message> {
        let consultation_id = self.message_index.get(&id)?;
        let thread = self.threads.get(consultation_id)?;
        thread
            .binary_search_by_key(&id, |m| m.id)
            .ok()
            .map(|idx| &thread[idx])
    }

    fn has_key(&self, consultation_id: Snowflake, sender_id: Snowflake, key: &str) -> bool {
        self.threads.get(&consultation_id).is_some_and(|thread| {
            thread
                .iter()
                .any(|m| m.sender_id == Some(sender_id) && m.idempotency_key.as_deref() == Some(key))
        })
    }
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
    directory: DashMap<Snowflake, Participant>,
}

/// Shared in-memory store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consultations(&self) -> MemoryConsultationRepository {
        MemoryConsultationRepository {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn messages(&self) -> MemoryMessageRepository {
        MemoryMessageRepository {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn participants(&self) -> MemoryParticipantRepository {
        MemoryParticipantRepository {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Add or replace a directory entry
    pub fn insert_participant(&self, participant: Participant) {
        self.inner.directory.insert(participant.id, participant);
    }

    /// Drop a directory entry, e.g. an account deleted upstream
    pub fn remove_participant(&self, id: Snowflake) -> Option<Participant> {
        self.inner.directory.remove(&id).map(|(_, p)| p)
    }
}

// ============================================================================
// Consultations
// ============================================================================

#[derive(Clone)]
pub struct MemoryConsultationRepository {
    inner: Arc<Inner>,
}

#[async_trait]
impl ConsultationRepository for MemoryConsultationRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Consultation>> {
        let state = self.inner.state.lock();
        Ok(state.consultations.get(&id).cloned().map(Consultation::restore))
    }

    async fn find_page(&self, query: &ConsultationQuery) -> RepoResult<Page<Consultation>> {
        let mut matching: Vec<Consultation> = {
            let state = self.inner.state.lock();
            state
                .consultations
                .values()
                .cloned()
                .map(Consultation::restore)
                .filter(|c| query.matches(c))
                .collect()
        };
        matching.sort_by(|a, b| {
            b.requested_at
                .cmp(&a.requested_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(query.page.offset()).unwrap_or(usize::MAX))
            .take(query.page.page_size as usize)
            .collect();

        Ok(Page::new(items, query.page, total))
    }

    #[instrument(skip(self, consultation), fields(consultation_id = %consultation.id))]
    async fn create(&self, consultation: &Consultation) -> RepoResult<()> {
        let mut state = self.inner.state.lock();
        if state.consultations.contains_key(&consultation.id) {
            return Err(DomainError::DatabaseError(format!(
                "consultation {} already exists",
                consultation.id
            )));
        }
        let record = consultation.clone().into_record();
        state.threads.insert(record.id, Vec::new());
        state.consultations.insert(record.id, record);
        Ok(())
    }

    #[instrument(skip(self, consultation), fields(consultation_id = %consultation.id))]
    async fn bind_lawyer_if_unbound(&self, consultation: &Consultation) -> RepoResult<bool> {
        let mut state = self.inner.state.lock();
        let Some(stored) = state.consultations.get_mut(&consultation.id) else {
            return Ok(false);
        };
        if stored.status != ConsultationStatus::Pending || stored.lawyer_id.is_some() {
            return Ok(false);
        }

        stored.lawyer_id = consultation.lawyer_id;
        stored.status = consultation.status;
        stored.updated_at = consultation.updated_at;
        stored.version += 1;
        Ok(true)
    }

    #[instrument(
        skip(self, change),
        fields(consultation_id = %change.consultation.id, messages = change.new_messages.len())
    )]
    async fn commit(&self, change: &ConsultationChange) -> RepoResult<()> {
        let consultation = &change.consultation;
        let id = consultation.id;
        let mut state = self.inner.state.lock();

        // Validate everything before touching anything
        let Some(stored) = state.consultations.get(&id) else {
            return Err(DomainError::ConsultationNotFound(id));
        };
        if consultation.is_dirty() && stored.version != consultation.expected_version() {
            return Err(DomainError::StaleConsultation(id));
        }
        let mut batch_keys = HashSet::new();
        for message in &change.new_messages {
            if let (Some(sender), Some(key)) = (message.sender_id, message.idempotency_key.as_deref()) {
                if state.has_key(id, sender, key) || !batch_keys.insert((sender, key)) {
                    return Err(DomainError::DuplicateIdempotencyKey);
                }
            }
        }

        if consultation.is_dirty() {
            state.consultations.insert(id, consultation.clone().into_record());
        }

        let State {
            threads,
            message_index,
            ..
        } = &mut *state;
        let thread = threads.entry(id).or_default();

        if let Some(receipt) = change.read_receipt {
            for message in thread.iter_mut() {
                if !message.is_read && message.sender_role != receipt.reader {
                    message.is_read = true;
                    message.read_at = Some(receipt.read_at);
                }
            }
        }
        for message in &change.new_messages {
            let at = thread.partition_point(|m| m.id < message.id);
            thread.insert(at, message.clone());
            message_index.insert(message.id, id);
        }

        Ok(())
    }

    async fn stats(&self, scope: Scope) -> RepoResult<ConsultationStats> {
        let state = self.inner.state.lock();
        let mut stats = ConsultationStats::default();

        for record in state.consultations.values() {
            let unread = match scope {
                Scope::All => Some(0),
                Scope::Customer(id) => (record.customer_id == id).then_some(record.customer_unread_count),
                Scope::Lawyer(id) => (record.lawyer_id == Some(id)).then_some(record.lawyer_unread_count),
            };
            if let Some(unread) = unread {
                stats.add(record.status, 1);
                stats.unread += i64::from(unread);
            }
        }

        Ok(stats)
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Clone)]
pub struct MemoryMessageRepository {
    inner: Arc<Inner>,
}

#[async_trait]
impl MessageRepository for MemoryMessageRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let state = self.inner.state.lock();
        Ok(state.message(id).filter(|m| m.deleted_at.is_none()).cloned())
    }

    async fn find_by_idempotency_key(
        &self,
        consultation_id: Snowflake,
        sender_id: Snowflake,
        key: &str,
    ) -> RepoResult<Option<Message>> {
        let state = self.inner.state.lock();
        Ok(state.threads.get(&consultation_id).and_then(|thread| {
            thread
                .iter()
                .find(|m| m.sender_id == Some(sender_id) && m.idempotency_key.as_deref() == Some(key))
                .cloned()
        }))
    }

    async fn find_page(
        &self,
        consultation_id: Snowflake,
        page: PageRequest,
    ) -> RepoResult<Page<Message>> {
        let state = self.inner.state.lock();
        let visible: Vec<&Message> = state
            .threads
            .get(&consultation_id)
            .map(|thread| thread.iter().filter(|m| m.deleted_at.is_none()).collect())
            .unwrap_or_default();

        let total = visible.len() as u64;
        let items = visible
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.page_size as usize)
            .cloned()
            .collect();

        Ok(Page::new(items, page, total))
    }
}

// ============================================================================
// Participants
// ============================================================================

#[derive(Clone)]
pub struct MemoryParticipantRepository {
    inner: Arc<Inner>,
}

#[async_trait]
impl ParticipantRepository for MemoryParticipantRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Participant>> {
        Ok(self.inner.directory.get(&id).map(|p| p.value().clone()))
    }

    async fn find_many(&self, ids: &[Snowflake]) -> RepoResult<Vec<Participant>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.inner.directory.get(id).map(|p| p.value().clone()))
            .collect())
    }
}

#[async_trait]
impl ReadinessProbe for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn check(&self) -> RepoResult<()> {
        Ok(())
    }
}
