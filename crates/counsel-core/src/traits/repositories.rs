//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation (PostgreSQL or in-memory).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Consultation, Message, Participant};
use crate::error::DomainError;
use crate::value_objects::{ConsultationStatus, SenderRole, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Pagination
// ============================================================================

/// 1-based page request with a clamped page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub const DEFAULT_PAGE_SIZE: u32 = 50;
    pub const MAX_PAGE_SIZE: u32 = 100;

    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(Self::DEFAULT_PAGE_SIZE)
                .clamp(1, Self::MAX_PAGE_SIZE),
        }
    }

    #[inline]
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    #[inline]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total,
        }
    }

    /// Number of pages; 0 for an empty result
    pub fn pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.page_size.max(1)))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
        }
    }
}

// ============================================================================
// Consultation Repository
// ============================================================================

/// Whose consultations a listing or a stats query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Customer(Snowflake),
    Lawyer(Snowflake),
}

/// Listing filter. Results are ordered newest request first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsultationQuery {
    pub scope: Scope,
    pub status: Option<ConsultationStatus>,
    /// Only pending consultations nobody is bound to
    pub unbound_only: bool,
    pub page: PageRequest,
}

impl ConsultationQuery {
    pub fn scoped(scope: Scope, status: Option<ConsultationStatus>, page: PageRequest) -> Self {
        Self {
            scope,
            status,
            unbound_only: false,
            page,
        }
    }

    pub fn available(page: PageRequest) -> Self {
        Self {
            scope: Scope::All,
            status: Some(ConsultationStatus::Pending),
            unbound_only: true,
            page,
        }
    }

    /// Whether a consultation passes the filter (pagination aside)
    pub fn matches(&self, c: &Consultation) -> bool {
        let in_scope = match self.scope {
            Scope::All => true,
            Scope::Customer(id) => c.customer_id == id,
            Scope::Lawyer(id) => c.lawyer_id == Some(id),
        };
        in_scope
            && self.status.map_or(true, |s| c.status == s)
            && (!self.unbound_only || c.is_open_for_claim())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsultationStats {
    pub total: i64,
    pub pending: i64,
    pub assigned: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
    /// Sum of the scope owner's unread counters; 0 for [`Scope::All`]
    pub unread: i64,
}

impl ConsultationStats {
    pub fn add(&mut self, status: ConsultationStatus, count: i64) {
        self.total += count;
        match status {
            ConsultationStatus::Pending => self.pending += count,
            ConsultationStatus::Assigned => self.assigned += count,
            ConsultationStatus::InProgress => self.in_progress += count,
            ConsultationStatus::Completed => self.completed += count,
            ConsultationStatus::Cancelled => self.cancelled += count,
        }
    }
}

/// Mark every message not sent by `reader` as read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadReceipt {
    pub reader: SenderRole,
    pub read_at: DateTime<Utc>,
}

/// One atomic write: the new consultation state, guarded by
/// `consultation.expected_version()`, plus the thread changes that go with it.
#[derive(Debug, Clone)]
pub struct ConsultationChange {
    pub consultation: Consultation,
    pub new_messages: Vec<Message>,
    pub read_receipt: Option<ReadReceipt>,
}

impl ConsultationChange {
    pub fn new(consultation: Consultation) -> Self {
        Self {
            consultation,
            new_messages: Vec::new(),
            read_receipt: None,
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.new_messages.push(message);
        self
    }

    pub fn with_read_receipt(mut self, receipt: ReadReceipt) -> Self {
        self.read_receipt = Some(receipt);
        self
    }
}

#[async_trait]
pub trait ConsultationRepository: Send + Sync {
    /// Find consultation by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Consultation>>;

    /// List consultations matching a query
    async fn find_page(&self, query: &ConsultationQuery) -> RepoResult<Page<Consultation>>;

    /// Insert a freshly requested consultation
    async fn create(&self, consultation: &Consultation) -> RepoResult<()>;

    /// Store the lawyer binding of a claimed/assigned consultation, but only
    /// if the stored row is still pending and unbound. Returns `false` when
    /// someone else got there first.
    async fn bind_lawyer_if_unbound(&self, consultation: &Consultation) -> RepoResult<bool>;

    /// Apply a change atomically.
    /// Fails with `StaleConsultation` if the stored version moved on, and with
    /// `DuplicateIdempotencyKey` if a new message reuses a sender's key.
    async fn commit(&self, change: &ConsultationChange) -> RepoResult<()>;

    /// Per-status counts and unread total for a scope
    async fn stats(&self, scope: Scope) -> RepoResult<ConsultationStats>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// Message a sender already posted under an idempotency key
    async fn find_by_idempotency_key(
        &self,
        consultation_id: Snowflake,
        sender_id: Snowflake,
        key: &str,
    ) -> RepoResult<Option<Message>>;

    /// Thread page, oldest first
    async fn find_page(&self, consultation_id: Snowflake, page: PageRequest)
        -> RepoResult<Page<Message>>;
}

// ============================================================================
// Participant Repository
// ============================================================================

#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Find participant by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Participant>>;

    /// Resolve several participants at once; unknown ids are skipped
    async fn find_many(&self, ids: &[Snowflake]) -> RepoResult<Vec<Participant>>;
}
