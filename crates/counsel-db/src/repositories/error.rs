//! Error handling utilities for repositories

use counsel_core::error::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError.
///
/// Pool exhaustion and connection loss are reported as `StorageUnavailable`
/// so callers can tell a retryable outage from a failed statement.
pub fn map_db_error(e: SqlxError) -> DomainError {
    match e {
        SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) => {
            DomainError::StorageUnavailable(e.to_string())
        }
        other => DomainError::DatabaseError(other.to_string()),
    }
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    map_db_error(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_transient() {
        assert!(map_db_error(SqlxError::PoolTimedOut).is_transient());
        assert!(matches!(
            map_db_error(SqlxError::RowNotFound),
            DomainError::DatabaseError(_)
        ));
    }
}
