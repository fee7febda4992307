//! Consultation entity <-> model mapper

use counsel_core::entities::{Consultation, ConsultationRecord};
use counsel_core::error::DomainError;
use counsel_core::value_objects::Snowflake;

use crate::models::ConsultationModel;

use super::parse_column;

/// Rows come back through the enum parsers; an unknown status string means
/// the table was written by something else and is reported as a database error.
impl TryFrom<ConsultationModel> for Consultation {
    type Error = DomainError;

    fn try_from(model: ConsultationModel) -> Result<Self, Self::Error> {
        Ok(Consultation::restore(ConsultationRecord {
            id: Snowflake::new(model.id),
            customer_id: Snowflake::new(model.customer_id),
            lawyer_id: model.lawyer_id.map(Snowflake::new),
            subject: model.subject,
            description: model.description,
            priority: parse_column(&model.priority)?,
            status: parse_column(&model.status)?,
            chat_status: parse_column(&model.chat_status)?,
            preferred_lawyer: model.preferred_lawyer,
            attachments: model.attachments,
            response: model.response,
            notes: model.notes,
            decline_reason: model.decline_reason,
            customer_unread_count: model.customer_unread_count,
            lawyer_unread_count: model.lawyer_unread_count,
            requested_at: model.requested_at,
            chat_started_at: model.chat_started_at,
            last_message_at: model.last_message_at,
            answered_at: model.answered_at,
            completed_at: model.completed_at,
            updated_at: model.updated_at,
            version: model.version,
        }))
    }
}

/// Consultation values in column order, ready to bind
pub struct ConsultationRow<'a> {
    pub id: i64,
    pub customer_id: i64,
    pub lawyer_id: Option<i64>,
    pub priority: &'static str,
    pub status: &'static str,
    pub chat_status: &'static str,
    pub record: &'a ConsultationRecord,
}

impl<'a> ConsultationRow<'a> {
    pub fn new(consultation: &'a Consultation) -> Self {
        let record: &ConsultationRecord = consultation;
        Self {
            id: record.id.into_inner(),
            customer_id: record.customer_id.into_inner(),
            lawyer_id: record.lawyer_id.map(Snowflake::into_inner),
            priority: record.priority.as_str(),
            status: record.status.as_str(),
            chat_status: record.chat_status.as_str(),
            record,
        }
    }
}
