//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize`; bodies also implement `Validate`.

use serde::Deserialize;
use validator::Validate;

use counsel_core::entities::NewMessage;
use counsel_core::traits::PageRequest;
use counsel_core::value_objects::{ConsultationStatus, MessageType, Priority, Snowflake};

// ============================================================================
// Consultation Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateConsultationRequest {
    #[validate(length(min = 1, max = 200, message = "Subject must be 1-200 characters"))]
    pub subject: String,

    #[validate(length(min = 1, max = 5000, message = "Description must be 1-5000 characters"))]
    pub description: String,

    #[serde(default)]
    pub priority: Priority,

    /// Lawyer the customer wants; bound immediately
    pub preferred_lawyer_id: Option<Snowflake>,

    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 attachments"))]
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DeclineConsultationRequest {
    #[validate(length(max = 1000, message = "Reason must be at most 1000 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignLawyerRequest {
    pub lawyer_id: Snowflake,
}

/// Lawyer's written answer and/or internal notes
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RespondConsultationRequest {
    #[validate(length(min = 1, max = 5000, message = "Response must be 1-5000 characters"))]
    pub response: Option<String>,

    #[validate(length(max = 5000, message = "Notes must be at most 5000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListConsultationsQuery {
    pub status: Option<ConsultationStatus>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListConsultationsQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

// ============================================================================
// Message Requests
// ============================================================================

/// Content and attachment limits are deployment settings and are checked by
/// the message service, not here.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub message_type: MessageType,

    #[serde(default)]
    pub attachments: Vec<String>,

    pub reply_to: Option<Snowflake>,

    /// Client-generated key; resending with the same key returns the
    /// original message instead of posting twice
    #[validate(length(min = 1, max = 128, message = "Idempotency key must be 1-128 characters"))]
    pub idempotency_key: Option<String>,
}

impl From<SendMessageRequest> for NewMessage {
    fn from(req: SendMessageRequest) -> Self {
        NewMessage {
            content: req.content,
            message_type: req.message_type,
            attachments: req.attachments,
            reply_to: req.reply_to,
            idempotency_key: req.idempotency_key,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}
