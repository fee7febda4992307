//! Entity to model mappers
//!
//! - `TryFrom<Model> for Entity`: database rows to domain objects
//! - `*Insert` / `*Row` structs: entity data prepared for binding

mod consultation;
mod message;
mod user;

use std::str::FromStr;

use counsel_core::error::DomainError;

pub use consultation::ConsultationRow;
pub use message::MessageInsert;
pub use user::UserInsert;

/// Parse a TEXT column holding one of the domain's string enums
pub(crate) fn parse_column<T>(value: &str) -> Result<T, DomainError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| DomainError::DatabaseError(format!("corrupt row: {e}")))
}
