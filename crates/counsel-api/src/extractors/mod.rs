//! Axum extractors for request handling
//!
//! Custom extractors for authentication, validation, path ids and paging.

mod auth;
mod pagination;
mod path;
mod validated;

pub use auth::AuthUser;
pub use pagination::{ConsultationFilter, Pagination};
pub use path::ConsultationPath;
pub use validated::{OptionalValidatedJson, ValidatedJson};
