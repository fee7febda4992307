//! Value objects - immutable types that represent domain concepts

mod role;
mod snowflake;
mod status;

pub use role::{Actor, Role, SenderRole};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
pub use status::{
    AttachmentKind, ChatStatus, ConsultationStatus, MessageType, ParseEnumError, Priority,
};
