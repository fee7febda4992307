//! Domain events - emitted after a consultation change has been committed
//!
//! These events are used for:
//! - Pushing "status changed" / "new message" notices to subscribers
//! - Letting clients know when to re-fetch a consultation or thread

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Consultation, Message};
use crate::value_objects::{ChatStatus, ConsultationStatus, SenderRole, Snowflake};

/// All possible domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    // =========================================================================
    // Consultation Events
    // =========================================================================
    ConsultationRequested(ConsultationChangedEvent),
    ConsultationClaimed(ConsultationChangedEvent),
    ConsultationAssigned(ConsultationChangedEvent),
    ConsultationAccepted(ConsultationChangedEvent),
    ConsultationDeclined(ConsultationChangedEvent),
    ConsultationCompleted(ConsultationChangedEvent),
    ConsultationCancelled(ConsultationChangedEvent),

    // =========================================================================
    // Message Events
    // =========================================================================
    MessageCreated(MessageCreatedEvent),
    MessagesRead(MessagesReadEvent),
}

impl DomainEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ConsultationRequested(_) => "CONSULTATION_REQUESTED",
            Self::ConsultationClaimed(_) => "CONSULTATION_CLAIMED",
            Self::ConsultationAssigned(_) => "CONSULTATION_ASSIGNED",
            Self::ConsultationAccepted(_) => "CONSULTATION_ACCEPTED",
            Self::ConsultationDeclined(_) => "CONSULTATION_DECLINED",
            Self::ConsultationCompleted(_) => "CONSULTATION_COMPLETED",
            Self::ConsultationCancelled(_) => "CONSULTATION_CANCELLED",
            Self::MessageCreated(_) => "MESSAGE_CREATED",
            Self::MessagesRead(_) => "MESSAGES_READ",
        }
    }

    pub fn consultation_id(&self) -> Snowflake {
        match self {
            Self::ConsultationRequested(e)
            | Self::ConsultationClaimed(e)
            | Self::ConsultationAssigned(e)
            | Self::ConsultationAccepted(e)
            | Self::ConsultationDeclined(e)
            | Self::ConsultationCompleted(e)
            | Self::ConsultationCancelled(e) => e.consultation_id,
            Self::MessageCreated(e) => e.consultation_id,
            Self::MessagesRead(e) => e.consultation_id,
        }
    }

    /// Users that should hear about the event on their personal channel
    pub fn recipients(&self) -> Vec<Snowflake> {
        let (customer, lawyer) = match self {
            Self::ConsultationRequested(e)
            | Self::ConsultationClaimed(e)
            | Self::ConsultationAssigned(e)
            | Self::ConsultationAccepted(e)
            | Self::ConsultationDeclined(e)
            | Self::ConsultationCompleted(e)
            | Self::ConsultationCancelled(e) => (e.customer_id, e.lawyer_id),
            Self::MessageCreated(e) => (e.customer_id, e.lawyer_id),
            Self::MessagesRead(e) => (e.customer_id, e.lawyer_id),
        };
        std::iter::once(customer).chain(lawyer).collect()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::ConsultationRequested(e)
            | Self::ConsultationClaimed(e)
            | Self::ConsultationAssigned(e)
            | Self::ConsultationAccepted(e)
            | Self::ConsultationDeclined(e)
            | Self::ConsultationCompleted(e)
            | Self::ConsultationCancelled(e) => e.timestamp,
            Self::MessageCreated(e) => e.timestamp,
            Self::MessagesRead(e) => e.timestamp,
        }
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationChangedEvent {
    pub consultation_id: Snowflake,
    pub customer_id: Snowflake,
    pub lawyer_id: Option<Snowflake>,
    pub status: ConsultationStatus,
    pub chat_status: ChatStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreatedEvent {
    pub consultation_id: Snowflake,
    pub message_id: Snowflake,
    pub customer_id: Snowflake,
    pub lawyer_id: Option<Snowflake>,
    pub sender_id: Option<Snowflake>,
    pub sender_role: SenderRole,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesReadEvent {
    pub consultation_id: Snowflake,
    pub customer_id: Snowflake,
    pub lawyer_id: Option<Snowflake>,
    pub reader_role: SenderRole,
    pub timestamp: DateTime<Utc>,
}

impl ConsultationChangedEvent {
    pub fn from_consultation(c: &Consultation) -> Self {
        Self {
            consultation_id: c.id,
            customer_id: c.customer_id,
            lawyer_id: c.lawyer_id,
            status: c.status,
            chat_status: c.chat_status,
            timestamp: c.updated_at,
        }
    }
}

impl MessageCreatedEvent {
    pub fn new(c: &Consultation, message: &Message) -> Self {
        Self {
            consultation_id: c.id,
            message_id: message.id,
            customer_id: c.customer_id,
            lawyer_id: c.lawyer_id,
            sender_id: message.sender_id,
            sender_role: message.sender_role,
            timestamp: message.created_at,
        }
    }
}

impl MessagesReadEvent {
    pub fn new(c: &Consultation, reader_role: SenderRole, at: DateTime<Utc>) -> Self {
        Self {
            consultation_id: c.id,
            customer_id: c.customer_id,
            lawyer_id: c.lawyer_id,
            reader_role,
            timestamp: at,
        }
    }
}
