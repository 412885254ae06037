//! Error type shared by every database operation of this crate.

use std::borrow::Cow;

use deadpool::managed::TimeoutType;
use diesel::result::{ConnectionError, Error as DieselError};
use diesel_async::pooled_connection::PoolError as ManagerError;
use diesel_async::pooled_connection::deadpool::PoolError;

use crate::TRACING_TARGET_CONNECTION;
use crate::types::ConstraintViolation;

/// Type-erased error, used for migration failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a PostgreSQL operation.
#[derive(Debug, thiserror::Error)]
#[must_use = "database errors should be handled"]
pub enum PgError {
    /// The client configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Waiting for, creating or recycling a pooled connection timed out.
    #[error("database operation timed out ({0:?})")]
    Timeout(TimeoutType),

    /// A connection could not be established or was lost.
    #[error("database connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Applying the embedded migrations failed.
    #[error("database migration error: {0}")]
    Migration(BoxError),

    /// A statement failed, including constraint violations.
    #[error("database query error: {0}")]
    Query(#[from] DieselError),

    /// Anything not covered above.
    #[error("unexpected database error: {0}")]
    Unexpected(Cow<'static, str>),
}

impl PgError {
    /// Returns the name of the violated constraint, if this is a constraint
    /// violation reported by the server.
    pub fn constraint(&self) -> Option<&str> {
        match self {
            Self::Query(DieselError::DatabaseError(_, info)) => info.constraint_name(),
            _ => None,
        }
    }

    /// Returns the typed constraint violation, if the constraint is known.
    pub fn constraint_violation(&self) -> Option<ConstraintViolation> {
        self.constraint().and_then(ConstraintViolation::new)
    }

    /// Returns whether the row that was looked up does not exist.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Query(DieselError::NotFound))
    }

    /// Returns whether retrying the operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Connection(ConnectionError::BadConnection(_))
        )
    }
}

impl From<PoolError> for PgError {
    fn from(value: PoolError) -> Self {
        match value {
            PoolError::Timeout(timeout) => Self::Timeout(timeout),
            PoolError::Backend(ManagerError::QueryError(error)) => Self::Query(error),
            PoolError::Backend(ManagerError::ConnectionError(error)) => Self::Connection(error),
            PoolError::PostCreateHook(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_CONNECTION,
                    error = %error,
                    "post-create hook rejected a connection"
                );
                Self::Unexpected(error.to_string().into())
            }
            PoolError::NoRuntimeSpecified => Self::Unexpected("pool has no async runtime".into()),
            PoolError::Closed => Self::Connection(ConnectionError::BadConnection(
                "connection pool is closed".to_owned(),
            )),
        }
    }
}

/// Result of a database operation.
pub type PgResult<T, E = PgError> = Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_detected() {
        let error = PgError::from(DieselError::NotFound);
        assert!(error.is_not_found());
        assert!(error.constraint().is_none());
        assert!(!error.is_transient());
    }

    #[test]
    fn timeouts_are_transient() {
        assert!(PgError::Timeout(TimeoutType::Wait).is_transient());
        assert!(!PgError::Config("bad".into()).is_transient());
    }

    #[test]
    fn closed_pool_maps_to_connection_error() {
        let error = PgError::from(PoolError::Closed);
        assert!(matches!(error, PgError::Connection(_)));
        assert!(error.is_transient());
    }
}
