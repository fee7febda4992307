//! Message entity <-> model mapper

use counsel_core::entities::{Message, ReplySnapshot};
use counsel_core::error::DomainError;
use counsel_core::value_objects::Snowflake;
use sqlx::types::Json;

use crate::models::MessageModel;

use super::parse_column;

impl TryFrom<MessageModel> for Message {
    type Error = DomainError;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        let reply_to = model.reply_to_id.map(|id| ReplySnapshot {
            message_id: Snowflake::new(id),
            content: model.reply_to_content.clone().unwrap_or_default(),
            sender_id: model.reply_to_sender_id.map(Snowflake::new),
        });

        Ok(Message {
            id: Snowflake::new(model.id),
            consultation_id: Snowflake::new(model.consultation_id),
            sender_id: model.sender_id.map(Snowflake::new),
            sender_role: parse_column(&model.sender_role)?,
            content: model.content,
            message_type: parse_column(&model.message_type)?,
            attachments: model.attachments.0,
            reply_to,
            is_read: model.is_read,
            read_at: model.read_at,
            idempotency_key: model.idempotency_key,
            created_at: model.created_at,
            edited_at: model.edited_at,
            deleted_at: model.deleted_at,
        })
    }
}

/// Convert Message entity reference to values for database insertion
pub struct MessageInsert<'a> {
    pub id: i64,
    pub consultation_id: i64,
    pub sender_id: Option<i64>,
    pub sender_role: &'static str,
    pub content: &'a str,
    pub message_type: &'static str,
    pub attachments: Json<&'a [counsel_core::Attachment]>,
    pub reply_to_id: Option<i64>,
    pub reply_to_content: Option<&'a str>,
    pub reply_to_sender_id: Option<i64>,
    pub is_read: bool,
    pub read_at: Option<chrono::DateTime<chrono::Utc>>,
    pub idempotency_key: Option<&'a str>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a Message) -> Self {
        let reply = message.reply_to.as_ref();
        Self {
            id: message.id.into_inner(),
            consultation_id: message.consultation_id.into_inner(),
            sender_id: message.sender_id.map(Snowflake::into_inner),
            sender_role: message.sender_role.as_str(),
            content: &message.content,
            message_type: message.message_type.as_str(),
            attachments: Json(message.attachments.as_slice()),
            reply_to_id: reply.map(|r| r.message_id.into_inner()),
            reply_to_content: reply.map(|r| r.content.as_str()),
            reply_to_sender_id: reply.and_then(|r| r.sender_id).map(Snowflake::into_inner),
            is_read: message.is_read,
            read_at: message.read_at,
            idempotency_key: message.idempotency_key.as_deref(),
            created_at: message.created_at,
        }
    }
}
