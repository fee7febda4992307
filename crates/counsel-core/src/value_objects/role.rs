//! Roles and the acting identity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{ParseEnumError, Snowflake};

/// Account role carried in the identity token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Lawyer,
    Customer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Lawyer => "lawyer",
            Self::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "lawyer" => Ok(Self::Lawyer),
            "customer" => Ok(Self::Customer),
            other => Err(ParseEnumError::new("role", other)),
        }
    }
}

/// Role a message was sent under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    Customer,
    Lawyer,
    System,
}

impl SenderRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Lawyer => "lawyer",
            Self::System => "system",
        }
    }

    /// Thread role of an account; admins never post into a thread
    pub fn from_role(role: Role) -> Option<Self> {
        match role {
            Role::Customer => Some(Self::Customer),
            Role::Lawyer => Some(Self::Lawyer),
            Role::Admin => None,
        }
    }
}

impl FromStr for SenderRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "lawyer" => Ok(Self::Lawyer),
            "system" => Ok(Self::System),
            other => Err(ParseEnumError::new("sender role", other)),
        }
    }
}

/// Authenticated caller of a domain operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Actor {
    pub id: Snowflake,
    pub role: Role,
}

impl Actor {
    pub const fn new(id: Snowflake, role: Role) -> Self {
        Self { id, role }
    }

    pub const fn customer(id: Snowflake) -> Self {
        Self::new(id, Role::Customer)
    }

    pub const fn lawyer(id: Snowflake) -> Self {
        Self::new(id, Role::Lawyer)
    }

    pub const fn admin(id: Snowflake) -> Self {
        Self::new(id, Role::Admin)
    }

    #[inline]
    pub fn is(&self, role: Role) -> bool {
        self.role == role
    }
}
