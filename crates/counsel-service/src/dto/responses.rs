//! Response DTOs for API endpoints
//!
//! Snowflake IDs serialize as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use counsel_core::entities::{Attachment, ReplySnapshot};
use counsel_core::traits::Page;
use counsel_core::value_objects::{
    ChatStatus, ConsultationStatus, MessageType, Priority, Role, SenderRole, Snowflake,
};

// ============================================================================
// Common Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Page of results with page-number pagination
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    /// 1-based page number
    pub current: u32,
    pub pages: u64,
    pub total: u64,
    pub page_size: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn from_page<U>(page: Page<U>, f: impl FnMut(U) -> T) -> Self {
        let pagination = PaginationMeta {
            current: page.page,
            pages: page.pages(),
            total: page.total,
            page_size: page.page_size,
        };
        Self {
            data: page.items.into_iter().map(f).collect(),
            pagination,
        }
    }
}

// ============================================================================
// Participant Responses
// ============================================================================

/// Display fields of a consultation participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantSummary {
    pub id: Snowflake,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Who wrote a message. `id` is absent for system messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SenderResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Snowflake>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub role: SenderRole,
}

// ============================================================================
// Consultation Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ConsultationResponse {
    pub id: Snowflake,
    pub customer: ParticipantSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lawyer: Option<ParticipantSummary>,
    pub subject: String,
    pub description: String,
    pub priority: Priority,
    pub status: ConsultationStatus,
    pub chat_status: ChatStatus,
    pub preferred_lawyer: bool,
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decline_reason: Option<String>,
    pub customer_unread_count: i32,
    pub lawyer_unread_count: i32,
    pub requested_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answered_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

/// Per-status counts plus the caller's unread total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsultationStatsResponse {
    pub total: i64,
    pub pending: i64,
    pub assigned: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub unread: i64,
}

// ============================================================================
// Message Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: Snowflake,
    pub consultation_id: Snowflake,
    pub sender: SenderResponse,
    pub content: String,
    pub message_type: MessageType,
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<ReplySnapshot>,
    pub is_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkReadResponse {
    pub consultation_id: Snowflake,
    pub reader_role: SenderRole,
    /// Reader's unread counter after the call, always 0
    pub unread_count: i32,
    pub read_at: DateTime<Utc>,
}

// ============================================================================
// Health Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response, one entry per probed dependency
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: BTreeMap<&'static str, String>,
}

impl ReadinessResponse {
    pub fn from_checks(checks: impl IntoIterator<Item = (&'static str, bool)>) -> Self {
        let checks: BTreeMap<_, _> = checks
            .into_iter()
            .map(|(name, ok)| (name, if ok { "healthy" } else { "unhealthy" }.to_string()))
            .collect();
        let all_healthy = checks.values().all(|v| v == "healthy");
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
