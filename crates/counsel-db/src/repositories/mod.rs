//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in counsel-core.

mod consultation;
mod error;
mod message;
mod participant;
mod readiness;

pub use consultation::PgConsultationRepository;
pub use error::{map_db_error, map_unique_violation};
pub use message::PgMessageRepository;
pub use participant::PgParticipantRepository;
pub use readiness::PgReadiness;
