//! Ports implemented by the infrastructure crates

mod publisher;
mod repositories;

pub use publisher::{EventPublisher, ReadinessProbe};
pub use repositories::{
    ConsultationChange, ConsultationQuery, ConsultationRepository, ConsultationStats,
    MessageRepository, Page, PageRequest, ParticipantRepository, ReadReceipt, RepoResult,
    Scope,
};
