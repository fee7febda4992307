//! Message entity - one entry in a consultation's thread

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{AttachmentKind, MessageType, SenderRole, Snowflake};

const REPLY_PREVIEW_CHARS: usize = 200;
const MAX_IDEMPOTENCY_KEY_LEN: usize = 128;

/// File reference attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    pub kind: AttachmentKind,
}

impl Attachment {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let kind = AttachmentKind::infer(&url);
        Self { url, kind }
    }
}

/// Copy of the replied-to message, frozen at reply time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplySnapshot {
    pub message_id: Snowflake,
    pub content: String,
    pub sender_id: Option<Snowflake>,
}

impl ReplySnapshot {
    pub fn of(message: &Message) -> Self {
        Self {
            message_id: message.id,
            content: message.preview(REPLY_PREVIEW_CHARS).to_string(),
            sender_id: message.sender_id,
        }
    }
}

/// Per-deployment limits applied to user messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageLimits {
    pub max_content_chars: usize,
    pub max_attachments: usize,
}

impl Default for MessageLimits {
    fn default() -> Self {
        Self {
            max_content_chars: 5000,
            max_attachments: 10,
        }
    }
}

/// What a participant asks to post
#[derive(Debug, Clone, Default)]
pub struct NewMessage {
    pub content: String,
    pub message_type: MessageType,
    pub attachments: Vec<String>,
    pub reply_to: Option<Snowflake>,
    pub idempotency_key: Option<String>,
}

impl NewMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self, limits: MessageLimits) -> Result<(), DomainError> {
        if self.message_type == MessageType::System {
            return Err(DomainError::SystemMessageNotAllowed);
        }
        if self.content.trim().is_empty() && self.attachments.is_empty() {
            return Err(DomainError::EmptyMessage);
        }
        if self.content.chars().count() > limits.max_content_chars {
            return Err(DomainError::ContentTooLong {
                max: limits.max_content_chars,
            });
        }
        if self.attachments.len() > limits.max_attachments {
            return Err(DomainError::TooManyAttachments {
                max: limits.max_attachments,
            });
        }
        if self.attachments.iter().any(|a| a.trim().is_empty()) {
            return Err(DomainError::ValidationError(
                "attachment reference must not be blank".into(),
            ));
        }
        if self.message_type == MessageType::File && self.attachments.is_empty() {
            return Err(DomainError::ValidationError(
                "file message requires an attachment".into(),
            ));
        }
        if let Some(key) = &self.idempotency_key {
            if key.is_empty() || key.len() > MAX_IDEMPOTENCY_KEY_LEN {
                return Err(DomainError::ValidationError(format!(
                    "idempotency key must be 1-{MAX_IDEMPOTENCY_KEY_LEN} bytes"
                )));
            }
        }
        Ok(())
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub consultation_id: Snowflake,
    /// `None` for system messages
    pub sender_id: Option<Snowflake>,
    pub sender_role: SenderRole,
    pub content: String,
    pub message_type: MessageType,
    pub attachments: Vec<Attachment>,
    pub reply_to: Option<ReplySnapshot>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Build a participant message from an already validated request
    pub fn from_participant(
        id: Snowflake,
        consultation_id: Snowflake,
        sender_id: Snowflake,
        sender_role: SenderRole,
        input: NewMessage,
        reply_to: Option<ReplySnapshot>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            consultation_id,
            sender_id: Some(sender_id),
            sender_role,
            content: input.content.trim().to_string(),
            message_type: input.message_type,
            attachments: input.attachments.into_iter().map(Attachment::new).collect(),
            reply_to,
            is_read: false,
            read_at: None,
            idempotency_key: input.idempotency_key,
            created_at: now,
            edited_at: None,
            deleted_at: None,
        }
    }

    /// Narration of a lifecycle change. Never counts as unread.
    pub fn system(
        id: Snowflake,
        consultation_id: Snowflake,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            consultation_id,
            sender_id: None,
            sender_role: SenderRole::System,
            content: content.into(),
            message_type: MessageType::System,
            attachments: Vec::new(),
            reply_to: None,
            is_read: true,
            read_at: Some(now),
            idempotency_key: None,
            created_at: now,
            edited_at: None,
            deleted_at: None,
        }
    }

    /// Unread from the point of view of `reader`
    #[inline]
    pub fn is_unread_for(&self, reader: SenderRole) -> bool {
        !self.is_read && self.sender_role != reader && self.sender_role != SenderRole::System
    }

    /// Leading part of the content, cut on a char boundary
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.content.char_indices().nth(max_chars) {
            Some((end, _)) => &self.content[..end],
            None => &self.content,
        }
    }
}
