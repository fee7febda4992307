//! Entity to DTO mappers
//!
//! Responses embed participant display fields, so mapping goes through a
//! [`Participants`] lookup loaded once per request.

use std::collections::HashMap;

use counsel_core::entities::{Attachment, Consultation, Message, Participant};
use counsel_core::traits::ConsultationStats;
use counsel_core::value_objects::{SenderRole, Snowflake};

use super::responses::{
    ConsultationResponse, ConsultationStatsResponse, MessageResponse, ParticipantSummary,
    SenderResponse,
};

/// Shown in place of an account the directory no longer knows
pub const DELETED_USER_NAME: &str = "[Deleted User]";
pub const SYSTEM_SENDER_NAME: &str = "System";

/// Participant directory entries relevant to one response
#[derive(Debug, Clone, Default)]
pub struct Participants {
    by_id: HashMap<Snowflake, Participant>,
}

impl Participants {
    pub fn new(participants: impl IntoIterator<Item = Participant>) -> Self {
        Self {
            by_id: participants.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    pub fn get(&self, id: Snowflake) -> Option<&Participant> {
        self.by_id.get(&id)
    }

    pub fn summary(&self, id: Snowflake) -> ParticipantSummary {
        match self.get(id) {
            Some(p) => ParticipantSummary::from(p),
            None => ParticipantSummary {
                id,
                name: DELETED_USER_NAME.to_string(),
                email: None,
                avatar: None,
                role: None,
            },
        }
    }

    pub fn sender(&self, message: &Message) -> SenderResponse {
        match (message.sender_role, message.sender_id) {
            (SenderRole::System, _) | (_, None) => SenderResponse {
                id: None,
                name: SYSTEM_SENDER_NAME.to_string(),
                avatar: None,
                role: SenderRole::System,
            },
            (role, Some(id)) => {
                let known = self.get(id);
                SenderResponse {
                    id: Some(id),
                    name: known.map_or_else(|| DELETED_USER_NAME.to_string(), |p| p.name.clone()),
                    avatar: known.and_then(|p| p.avatar.clone()),
                    role,
                }
            }
        }
    }
}

/// Participant ids a set of consultations refers to
pub fn consultation_participant_ids<'a>(
    consultations: impl IntoIterator<Item = &'a Consultation>,
) -> Vec<Snowflake> {
    let mut ids: Vec<Snowflake> = consultations
        .into_iter()
        .flat_map(|c| std::iter::once(c.customer_id).chain(c.lawyer_id))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Sender ids of a set of messages
pub fn message_sender_ids<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Vec<Snowflake> {
    let mut ids: Vec<Snowflake> = messages.into_iter().filter_map(|m| m.sender_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

// ============================================================================
// Participant Mappers
// ============================================================================

impl From<&Participant> for ParticipantSummary {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            email: Some(p.email.clone()),
            avatar: p.avatar.clone(),
            role: Some(p.role),
        }
    }
}

// ============================================================================
// Consultation Mappers
// ============================================================================

impl ConsultationResponse {
    pub fn new(c: &Consultation, participants: &Participants) -> Self {
        Self {
            id: c.id,
            customer: participants.summary(c.customer_id),
            lawyer: c.lawyer_id.map(|id| participants.summary(id)),
            subject: c.subject.clone(),
            description: c.description.clone(),
            priority: c.priority,
            status: c.status,
            chat_status: c.chat_status,
            preferred_lawyer: c.preferred_lawyer,
            attachments: c.attachments.iter().map(Attachment::new).collect(),
            response: c.response.clone(),
            notes: c.notes.clone(),
            decline_reason: c.decline_reason.clone(),
            customer_unread_count: c.customer_unread_count,
            lawyer_unread_count: c.lawyer_unread_count,
            requested_at: c.requested_at,
            chat_started_at: c.chat_started_at,
            last_message_at: c.last_message_at,
            answered_at: c.answered_at,
            completed_at: c.completed_at,
            updated_at: c.updated_at,
            version: c.version,
        }
    }
}

impl From<ConsultationStats> for ConsultationStatsResponse {
    fn from(s: ConsultationStats) -> Self {
        Self {
            total: s.total,
            pending: s.pending,
            assigned: s.assigned,
            in_progress: s.in_progress,
            completed: s.completed,
            cancelled: s.cancelled,
            unread: s.unread,
        }
    }
}

// ============================================================================
// Message Mappers
// ============================================================================

impl MessageResponse {
    pub fn new(message: Message, participants: &Participants) -> Self {
        let sender = participants.sender(&message);
        Self {
            id: message.id,
            consultation_id: message.consultation_id,
            sender,
            content: message.content,
            message_type: message.message_type,
            attachments: message.attachments,
            reply_to: message.reply_to,
            is_read: message.is_read,
            read_at: message.read_at,
            created_at: message.created_at,
            edited_at: message.edited_at,
        }
    }
}
