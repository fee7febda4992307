//! Database models - SQLx-compatible structs for PostgreSQL tables

mod consultation;
mod message;
mod user;

pub use consultation::{ConsultationModel, StatusCountModel, CONSULTATION_COLUMNS};
pub use message::{MessageModel, MESSAGE_COLUMNS};
pub use user::UserModel;
