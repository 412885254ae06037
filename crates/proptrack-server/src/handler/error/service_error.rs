//! Service error to HTTP error conversion.

use super::http_error::{Error as HttpError, ErrorKind};
use crate::{Error as ServiceError, ErrorKind as ServiceErrorKind};

/// Tracing target for service error conversions.
const TRACING_TARGET: &str = "proptrack_server::handler::service";

impl From<ServiceError> for HttpError<'static> {
    fn from(error: ServiceError) -> Self {
        tracing::error!(
            target: TRACING_TARGET,
            error = %error,
            kind = %error.kind(),
            "service operation failed"
        );

        match error.kind() {
            ServiceErrorKind::Auth => ErrorKind::Unauthorized
                .with_message("Authentication failed")
                .with_context(error.message().to_owned()),
            ServiceErrorKind::Storage => ErrorKind::InternalServerError
                .with_message("File storage is unavailable")
                .with_context(error.message().to_owned()),
            ServiceErrorKind::Config
            | ServiceErrorKind::Database
            | ServiceErrorKind::Internal => ErrorKind::InternalServerError
                .with_context(error.message().to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_are_unauthorized() {
        let error: HttpError = ServiceError::auth("token signing failed").into();
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        assert_eq!(error.context(), Some("token signing failed"));
    }

    #[test]
    fn internal_errors_keep_context() {
        let error: HttpError = ServiceError::internal("hasher", "failed").into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.context(), Some("hasher: failed"));
    }
}
