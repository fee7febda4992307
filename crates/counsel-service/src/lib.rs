//! # counsel-service
//!
//! Application layer: consultation lifecycle and chat use cases, request
//! and response DTOs.

pub mod dto;
pub mod services;

pub use services::{
    BroadcastPublisher, ConsultationService, MessageService, NoopPublisher, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult,
};

pub use dto::{
    ApiResponse, AssignLawyerRequest, ConsultationResponse, ConsultationStatsResponse,
    CreateConsultationRequest, DeclineConsultationRequest, HealthResponse, ListConsultationsQuery,
    MarkReadResponse, MessageResponse, PageQuery, PaginatedResponse, ReadinessResponse,
    RespondConsultationRequest, SendMessageRequest,
};
