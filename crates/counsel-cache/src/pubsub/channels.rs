//! Pub/Sub channel naming

use counsel_core::Snowflake;

/// Channel prefix for everything happening on one consultation
pub const CONSULTATION_CHANNEL_PREFIX: &str = "consultation:";
/// Channel prefix for user-specific events
pub const USER_CHANNEL_PREFIX: &str = "user:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    /// Events of one consultation (status changes, messages, receipts)
    Consultation(Snowflake),
    /// Events for a specific user (all their sessions)
    User(Snowflake),
}

impl PubSubChannel {
    #[must_use]
    pub fn consultation(consultation_id: Snowflake) -> Self {
        Self::Consultation(consultation_id)
    }

    #[must_use]
    pub fn user(user_id: Snowflake) -> Self {
        Self::User(user_id)
    }

    /// Get the Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Consultation(id) => format!("{CONSULTATION_CHANNEL_PREFIX}{id}"),
            Self::User(id) => format!("{USER_CHANNEL_PREFIX}{id}"),
        }
    }

    /// Parse a channel name back to a `PubSubChannel`
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(id) = name.strip_prefix(CONSULTATION_CHANNEL_PREFIX) {
            return Snowflake::parse(id).ok().map(Self::Consultation);
        }
        if let Some(id) = name.strip_prefix(USER_CHANNEL_PREFIX) {
            return Snowflake::parse(id).ok().map(Self::User);
        }
        None
    }
}

impl std::fmt::Display for PubSubChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
