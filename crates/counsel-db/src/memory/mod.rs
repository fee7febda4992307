//! In-memory storage backend for local runs and tests

mod store;

pub use store::{
    MemoryConsultationRepository, MemoryMessageRepository, MemoryParticipantRepository,
    MemoryStore,
};
