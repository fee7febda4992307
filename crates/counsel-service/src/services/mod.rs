//! Business logic services
//!
//! Services borrow a [`ServiceContext`] for one call, check the actor's
//! capability, drive the domain entity and commit through the repositories.

pub mod consultation;
pub mod context;
pub mod error;
pub mod events;
pub mod message;

pub use consultation::ConsultationService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use events::{BroadcastPublisher, NoopPublisher};
pub use message::MessageService;
