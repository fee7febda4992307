//! Consultation database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for consultations table
#[derive(Debug, Clone, FromRow)]
pub struct ConsultationModel {
    pub id: i64,
    pub customer_id: i64,
    pub lawyer_id: Option<i64>,
    pub subject: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub chat_status: String,
    pub preferred_lawyer: bool,
    pub attachments: Vec<String>,
    pub response: Option<String>,
    pub notes: Option<String>,
    pub decline_reason: Option<String>,
    pub customer_unread_count: i32,
    pub lawyer_unread_count: i32,
    pub requested_at: DateTime<Utc>,
    pub chat_started_at: Option<DateTime<Utc>>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub answered_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

/// `SELECT status, COUNT(*)` row
#[derive(Debug, Clone, FromRow)]
pub struct StatusCountModel {
    pub status: String,
    pub count: i64,
}

/// Column list shared by every consultation SELECT
pub const CONSULTATION_COLUMNS: &str = "id, customer_id, lawyer_id, subject, description, \
    priority, status, chat_status, preferred_lawyer, attachments, response, notes, \
    decline_reason, customer_unread_count, lawyer_unread_count, requested_at, chat_started_at, \
    last_message_at, answered_at, completed_at, updated_at, version";
