//! Import error to HTTP error conversion.

use super::http_error::{Error as HttpError, ErrorKind};
use crate::service::ImportError;

impl From<ImportError> for HttpError<'static> {
    fn from(error: ImportError) -> Self {
        let error = match error {
            ImportError::Csv(csv_error) => ErrorKind::BadRequest
                .with_message("The file is not a readable Price Paid Data CSV")
                .with_context(csv_error.to_string()),
            ImportError::InvalidBatchSize(size) => ErrorKind::BadRequest
                .with_message("Batch size must be between 1 and 5000")
                .with_context(format!("Requested batch size: {size}")),
            ImportError::NotFound(import_id) => ErrorKind::NotFound
                .with_message("Import not found")
                .with_context(format!("Import ID: {import_id}")),
            ImportError::NotCancellable { import_id, status } => ErrorKind::Conflict
                .with_message(format!("The import has already finished ({status})"))
                .with_context(format!("Import ID: {import_id}")),
            ImportError::Cancelled => {
                ErrorKind::Conflict.with_message("The import was cancelled")
            }
            ImportError::Io(io_error) => ErrorKind::InternalServerError
                .with_message("The import file could not be read")
                .with_context(io_error.to_string()),
            ImportError::Database(pg_error) => return pg_error.into(),
        };

        error.with_resource("import")
    }
}

#[cfg(test)]
mod tests {
    use proptrack_postgres::types::ImportStatus;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn finished_imports_conflict() {
        let error: HttpError = ImportError::NotCancellable {
            import_id: Uuid::nil(),
            status: ImportStatus::Completed,
        }
        .into();

        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.resource(), Some("import"));
        assert!(error.message().is_some_and(|m| m.contains("completed")));
    }

    #[test]
    fn invalid_batch_size_is_bad_request() {
        let error: HttpError = ImportError::InvalidBatchSize(0).into();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }
}
