//! Closed vocabularies of the consultation and message model.
//!
//! Every enum round-trips through the snake_case string stored in the
//! database and sent over the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unknown string for one of the closed enums
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ParseEnumError::new($kind, other)),
                }
            }
        }
    };
}

/// Business status of a consultation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

string_enum!(ConsultationStatus, "consultation status", {
    Pending => "pending",
    Assigned => "assigned",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl ConsultationStatus {
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Assigned,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Whether the message thread of a consultation accepts new messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStatus {
    WaitingAcceptance,
    Active,
    Closed,
}

string_enum!(ChatStatus, "chat status", {
    WaitingAcceptance => "waiting_acceptance",
    Active => "active",
    Closed => "closed",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

string_enum!(Priority, "priority", {
    Low => "low",
    Medium => "medium",
    High => "high",
    Urgent => "urgent",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Text,
    File,
    System,
}

string_enum!(MessageType, "message type", {
    Text => "text",
    File => "file",
    System => "system",
});

/// Display category of an attachment, derived from its file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Image,
    Video,
    Document,
}

string_enum!(AttachmentKind, "attachment kind", {
    Image => "image",
    Video => "video",
    Document => "document",
});

impl AttachmentKind {
    /// Classify a file reference by the extension of its last path segment.
    /// Query strings and fragments are ignored; unknown extensions are documents.
    pub fn infer(reference: &str) -> Self {
        let path = reference
            .split(['?', '#'])
            .next()
            .unwrap_or(reference);
        let file = path.rsplit('/').next().unwrap_or(path);
        let ext = match file.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => return Self::Document,
        };

        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "svg" | "webp" => Self::Image,
            "mp4" | "avi" | "mov" | "webm" => Self::Video,
            _ => Self::Document,
        }
    }
}
