//! Storage error to HTTP error conversion.

use proptrack_opendal::StorageError;

use super::http_error::{Error as HttpError, ErrorKind};

/// Tracing target for storage error conversions.
const TRACING_TARGET: &str = "proptrack_server::handler::storage";

impl From<StorageError> for HttpError<'static> {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound(path) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    path = %path,
                    "stored object is missing"
                );
                ErrorKind::NotFound
                    .with_message("File content not found")
                    .with_resource("file")
            }
            StorageError::InvalidPath(path) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    path = %path,
                    "invalid storage path"
                );
                ErrorKind::InternalServerError.into_error()
            }
            error => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    "storage operation failed"
                );
                ErrorKind::InternalServerError
                    .with_message("File storage is unavailable")
                    .with_resource("file")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_objects_are_not_found() {
        let error: HttpError = StorageError::NotFound("a/b".into()).into();
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.resource(), Some("file"));
    }

    #[test]
    fn backend_failures_are_internal() {
        let error: HttpError = StorageError::PermissionDenied("a/b".into()).into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
    }
}
