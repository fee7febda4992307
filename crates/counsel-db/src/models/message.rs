//! Message database model

use chrono::{DateTime, Utc};
use counsel_core::Attachment;
use sqlx::types::Json;
use sqlx::FromRow;

/// Database model for messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub consultation_id: i64,
    pub sender_id: Option<i64>,
    pub sender_role: String,
    pub content: String,
    pub message_type: String,
    pub attachments: Json<Vec<Attachment>>,
    pub reply_to_id: Option<i64>,
    pub reply_to_content: Option<String>,
    pub reply_to_sender_id: Option<i64>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

pub const MESSAGE_COLUMNS: &str = "id, consultation_id, sender_id, sender_role, content, \
    message_type, attachments, reply_to_id, reply_to_content, reply_to_sender_id, is_read, \
    read_at, idempotency_key, created_at, edited_at, deleted_at";
