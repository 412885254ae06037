//! Database error to HTTP error conversion.
//!
//! Known constraint violations become client errors with a precise message;
//! everything else is logged and reported as an internal error. The
//! per-table mappings live in the sibling `pg_*` modules.

use proptrack_postgres::{DieselError, PgError};
use proptrack_postgres::types::ConstraintViolation;

use crate::handler::{Error, ErrorKind};

/// Tracing target for database error conversions.
const TRACING_TARGET: &str = "proptrack_server::postgres_constraints";

impl From<ConstraintViolation> for Error<'static> {
    fn from(constraint: ConstraintViolation) -> Self {
        match constraint {
            ConstraintViolation::Account(c) => c.into(),
            ConstraintViolation::Property(c) => c.into(),
            ConstraintViolation::TenancyAgreement(c) => c.into(),
            ConstraintViolation::Invoice(c) => c.into(),
            ConstraintViolation::Transaction(c) => c.into(),
            ConstraintViolation::FileUpload(c) => c.into(),
            ConstraintViolation::LandRegistryImport(c) => c.into(),
        }
    }
}

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        match error {
            PgError::Config(config_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %config_error,
                    "database configuration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Timeout(timeout) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    timeout = ?timeout,
                    "database timeout",
                );
                ErrorKind::InternalServerError
                    .with_message("The database is busy")
                    .with_suggestion("Retry the request shortly")
            }
            PgError::Connection(connection_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %connection_error,
                    "database connection error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Migration(migration_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %migration_error,
                    "database migration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Query(ref query_error) => {
                if let Some(constraint_name) = error.constraint()
                    && let Some(constraint) = ConstraintViolation::new(constraint_name)
                {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        constraint = constraint_name,
                        error = %query_error,
                        "query error (constraint violation)"
                    );
                    return constraint.into();
                }

                if error.is_not_found() {
                    tracing::debug!(target: TRACING_TARGET, "query matched no rows");
                    return ErrorKind::NotFound.into_error();
                }

                tracing::error!(
                    target: TRACING_TARGET,
                    error = %query_error,
                    "query error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Unexpected(unexpected_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %unexpected_error,
                    "unexpected database error"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

// Used only for transactions.
impl From<DieselError> for Error<'static> {
    fn from(error: DieselError) -> Self {
        PgError::from(error).into()
    }
}

#[cfg(test)]
mod tests {
    use proptrack_postgres::types::{InvoiceConstraints, PropertyConstraints};

    use super::*;

    #[test]
    fn unique_constraints_are_conflicts() {
        let error: Error =
            ConstraintViolation::Invoice(InvoiceConstraints::AccountInvoiceNumberUnique).into();
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.resource(), Some("invoice"));
    }

    #[test]
    fn validation_constraints_are_bad_requests() {
        let error: Error = ConstraintViolation::Property(PropertyConstraints::PostcodeFormat).into();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.resource(), Some("property"));
    }

    #[test]
    fn config_errors_are_internal() {
        let error: Error = PgError::Config("bad url".into()).into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
    }

    #[test]
    fn missing_rows_are_not_found() {
        let error: Error = DieselError::NotFound.into();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }
}
