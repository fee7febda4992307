//! Domain entities - core business objects

mod consultation;
mod message;
mod participant;

pub use consultation::{
    CancelOutcome, Consultation, ConsultationRecord, NewConsultation, MAX_DESCRIPTION_CHARS,
    MAX_REQUEST_ATTACHMENTS, MAX_RESPONSE_CHARS, MAX_SUBJECT_CHARS,
};
pub use message::{Attachment, Message, MessageLimits, NewMessage, ReplySnapshot};
pub use participant::Participant;
