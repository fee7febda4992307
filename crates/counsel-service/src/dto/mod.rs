//! Data transfer objects for API requests and responses
//!
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers from domain entities to responses

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    AssignLawyerRequest, CreateConsultationRequest, DeclineConsultationRequest,
    ListConsultationsQuery, PageQuery, RespondConsultationRequest, SendMessageRequest,
};

pub use responses::{
    ApiResponse, ConsultationResponse, ConsultationStatsResponse, HealthResponse,
    MarkReadResponse, MessageResponse, PaginatedResponse, PaginationMeta, ParticipantSummary,
    ReadinessResponse, SenderResponse,
};

pub use mappers::{
    consultation_participant_ids, message_sender_ids, Participants, DELETED_USER_NAME,
    SYSTEM_SENDER_NAME,
};
