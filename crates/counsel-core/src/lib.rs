//! # counsel-core
//!
//! Domain layer for the consultation service: the consultation lifecycle
//! state machine, the message thread, role-based capability checks,
//! repository/publisher ports and domain events.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod policy;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Attachment, CancelOutcome, Consultation, ConsultationRecord, Message, MessageLimits,
    NewConsultation, NewMessage, Participant, ReplySnapshot,
};
pub use error::DomainError;
pub use events::DomainEvent;
pub use policy::Capability;
pub use traits::{
    ConsultationChange, ConsultationQuery, ConsultationRepository, ConsultationStats,
    EventPublisher, MessageRepository, Page, PageRequest, ParticipantRepository, ReadReceipt,
    ReadinessProbe, RepoResult, Scope,
};
pub use value_objects::{
    Actor, AttachmentKind, ChatStatus, ConsultationStatus, MessageType, ParseEnumError, Priority,
    Role, SenderRole, Snowflake, SnowflakeGenerator, SnowflakeParseError,
};
