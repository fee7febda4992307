//! Test fixtures
//!
//! The participants every test server is seeded with, request bodies and
//! the client-side view of response bodies.

use counsel_core::{ChatStatus, ConsultationStatus, Participant, Role, SenderRole, Snowflake};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

pub const CUSTOMER_ID: Snowflake = Snowflake::new(1_001);
pub const OTHER_CUSTOMER_ID: Snowflake = Snowflake::new(1_002);
pub const LAWYER_ID: Snowflake = Snowflake::new(2_001);
pub const OTHER_LAWYER_ID: Snowflake = Snowflake::new(2_002);
pub const ADMIN_ID: Snowflake = Snowflake::new(3_001);

static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

fn participant(id: Snowflake, name: &str, role: Role) -> Participant {
    Participant {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        avatar: None,
        role,
    }
}

pub fn customer() -> Participant {
    participant(CUSTOMER_ID, "Mara Quinn", Role::Customer)
}

pub fn other_customer() -> Participant {
    participant(OTHER_CUSTOMER_ID, "Theo Lind", Role::Customer)
}

pub fn lawyer() -> Participant {
    participant(LAWYER_ID, "Ines Okafor", Role::Lawyer)
}

pub fn other_lawyer() -> Participant {
    participant(OTHER_LAWYER_ID, "Ravi Patel", Role::Lawyer)
}

pub fn admin() -> Participant {
    participant(ADMIN_ID, "Ops Desk", Role::Admin)
}

/// Everyone a test server knows about
pub fn cast() -> Vec<Participant> {
    vec![customer(), other_customer(), lawyer(), other_lawyer(), admin()]
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CreateConsultation {
    pub subject: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_lawyer_id: Option<Snowflake>,
}

impl CreateConsultation {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            subject: format!("Tenancy deposit #{suffix}"),
            description: "Landlord is withholding the full deposit".to_string(),
            priority: None,
            preferred_lawyer_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SendMessage {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Snowflake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl SendMessage {
    pub fn text(content: &str) -> Self {
        Self {
            content: content.to_string(),
            reply_to: None,
            idempotency_key: None,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct Data<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Deserialize)]
pub struct PaginationMeta {
    pub current: u32,
    pub pages: u64,
    pub total: u64,
    pub page_size: u32,
}

#[derive(Debug, Deserialize)]
pub struct ParticipantView {
    pub id: Snowflake,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ConsultationView {
    pub id: Snowflake,
    pub customer: ParticipantView,
    pub lawyer: Option<ParticipantView>,
    pub status: ConsultationStatus,
    pub chat_status: ChatStatus,
    pub decline_reason: Option<String>,
    pub customer_unread_count: i32,
    pub lawyer_unread_count: i32,
    pub version: i64,
}

#[derive(Debug, Deserialize)]
pub struct SenderView {
    pub id: Option<Snowflake>,
    pub name: String,
    pub role: SenderRole,
}

#[derive(Debug, Deserialize)]
pub struct MessageView {
    pub id: Snowflake,
    pub consultation_id: Snowflake,
    pub sender: SenderView,
    pub content: String,
    pub is_read: bool,
}

#[derive(Debug, Deserialize)]
pub struct StatsView {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub unread: i64,
}
