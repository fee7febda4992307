//! Application error types
//!
//! Errors raised outside the domain (identity, configuration, backends)
//! plus the status mapping shared by every layer above the domain.

use counsel_core::DomainError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl AppError {
    /// HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::InvalidToken | Self::TokenExpired => 401,
            Self::Database(_) | Self::Cache(_) | Self::Internal(_) | Self::Config(_) => 500,
            Self::Domain(e) => domain_status(e),
        }
    }

    /// Stable machine-readable code for API bodies
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// HTTP status for a domain error category
#[must_use]
pub fn domain_status(e: &DomainError) -> u16 {
    if e.is_not_found() {
        404
    } else if e.is_authorization() {
        403
    } else if e.is_validation() {
        400
    } else if e.is_conflict() {
        409
    } else if e.is_transient() {
        503
    } else {
        500
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use counsel_core::Snowflake;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidToken.status_code(), 401);
        assert_eq!(AppError::TokenExpired.error_code(), "TOKEN_EXPIRED");
        assert_eq!(AppError::Validation("subject".into()).status_code(), 400);
        assert_eq!(AppError::Config("JWT_SECRET".into()).status_code(), 500);
        assert_eq!(AppError::internal(anyhow::anyhow!("boom")).error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_domain_error_mapping() {
        let cases = [
            (DomainError::ConsultationNotFound(Snowflake::new(1)), 404, "UNKNOWN_CONSULTATION"),
            (DomainError::NotBoundLawyer, 403, "NOT_BOUND_LAWYER"),
            (DomainError::AlreadyClaimed, 409, "ALREADY_CLAIMED"),
            (DomainError::ChatNotActive, 409, "CHAT_NOT_ACTIVE"),
            (DomainError::EmptyMessage, 400, "VALIDATION_ERROR"),
            (DomainError::StorageUnavailable("timeout".into()), 503, "STORAGE_UNAVAILABLE"),
            (DomainError::DatabaseError("boom".into()), 500, "DATABASE_ERROR"),
        ];
        for (domain, status, code) in cases {
            let err = AppError::from(domain);
            assert_eq!(err.status_code(), status);
            assert_eq!(err.error_code(), code);
        }
    }
}
