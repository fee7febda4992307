//! Participant - read-only view of a user account owned by the identity service

use crate::value_objects::{Role, Snowflake};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: Snowflake,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: Role,
}

impl Participant {
    #[inline]
    pub fn is_lawyer(&self) -> bool {
        self.role == Role::Lawyer
    }
}
