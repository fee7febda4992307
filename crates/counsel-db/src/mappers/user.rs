//! Participant entity <-> users row mapper

use counsel_core::entities::Participant;
use counsel_core::error::DomainError;
use counsel_core::value_objects::Snowflake;

use crate::models::UserModel;

use super::parse_column;

impl TryFrom<UserModel> for Participant {
    type Error = DomainError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        Ok(Participant {
            id: Snowflake::new(model.id),
            name: model.name,
            email: model.email,
            avatar: model.avatar,
            role: parse_column(&model.role)?,
        })
    }
}

/// Convert Participant reference to values for an upsert
pub struct UserInsert<'a> {
    pub id: i64,
    pub name: &'a str,
    pub email: &'a str,
    pub avatar: Option<&'a str>,
    pub role: &'static str,
}

impl<'a> UserInsert<'a> {
    pub fn new(participant: &'a Participant) -> Self {
        Self {
            id: participant.id.into_inner(),
            name: &participant.name,
            email: &participant.email,
            avatar: participant.avatar.as_deref(),
            role: participant.role.as_str(),
        }
    }
}
