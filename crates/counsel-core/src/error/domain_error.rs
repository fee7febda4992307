//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{ChatStatus, ConsultationStatus, Role, Snowflake};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Consultation not found: {0}")]
    ConsultationNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Message must have content or at least one attachment")]
    EmptyMessage,

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Too many attachments: max {max}")]
    TooManyAttachments { max: usize },

    #[error("System messages cannot be sent by users")]
    SystemMessageNotAllowed,

    #[error("Reply target {0} is not part of this consultation")]
    InvalidReplyTarget(Snowflake),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Only the lawyer bound to this consultation can do that")]
    NotBoundLawyer,

    #[error("Role {role} is not allowed to {action}")]
    RoleNotAllowed { role: Role, action: &'static str },

    #[error("Not a participant of this consultation")]
    NotParticipant,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Consultation has already been claimed")]
    AlreadyClaimed,

    #[error("Cannot {action} a consultation in state {status}/{chat_status}")]
    InvalidTransition {
        action: &'static str,
        status: ConsultationStatus,
        chat_status: ChatStatus,
    },

    #[error("Chat is not active")]
    ChatNotActive,

    #[error("Consultation {0} was modified concurrently")]
    StaleConsultation(Snowflake),

    #[error("Idempotency key already used")]
    DuplicateIdempotencyKey,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::ConsultationNotFound(_) => "UNKNOWN_CONSULTATION",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::UserNotFound(_) => "UNKNOWN_USER",

            // Validation
            Self::ValidationError(_)
            | Self::EmptyMessage
            | Self::ContentTooLong { .. }
            | Self::TooManyAttachments { .. }
            | Self::SystemMessageNotAllowed
            | Self::InvalidReplyTarget(_) => "VALIDATION_ERROR",

            // Authorization
            Self::NotBoundLawyer => "NOT_BOUND_LAWYER",
            Self::RoleNotAllowed { .. } => "ROLE_NOT_ALLOWED",
            Self::NotParticipant => "NOT_PARTICIPANT",

            // Conflict
            Self::AlreadyClaimed => "ALREADY_CLAIMED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::ChatNotActive => "CHAT_NOT_ACTIVE",
            Self::StaleConsultation(_) => "STALE_CONSULTATION",
            Self::DuplicateIdempotencyKey => "DUPLICATE_IDEMPOTENCY_KEY",

            // Infrastructure
            Self::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ConsultationNotFound(_) | Self::MessageNotFound(_) | Self::UserNotFound(_)
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::EmptyMessage
                | Self::ContentTooLong { .. }
                | Self::TooManyAttachments { .. }
                | Self::SystemMessageNotAllowed
                | Self::InvalidReplyTarget(_)
        )
    }

    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::NotBoundLawyer | Self::RoleNotAllowed { .. } | Self::NotParticipant
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::AlreadyClaimed
                | Self::InvalidTransition { .. }
                | Self::ChatNotActive
                | Self::StaleConsultation(_)
                | Self::DuplicateIdempotencyKey
        )
    }

    /// Failures that may succeed if the same call is repeated later
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}
