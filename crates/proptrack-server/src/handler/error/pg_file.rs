//! File upload constraint violation error handlers.

use proptrack_postgres::types::FileUploadConstraints;

use crate::handler::{Error, ErrorKind};

impl From<FileUploadConstraints> for Error<'static> {
    fn from(c: FileUploadConstraints) -> Self {
        let error = match c {
            FileUploadConstraints::FileNameLength => ErrorKind::BadRequest
                .with_message("File name must be between 1 and 255 characters long"),
            FileUploadConstraints::FileSizePositive => {
                ErrorKind::BadRequest.with_message("File cannot be empty")
            }
            FileUploadConstraints::Sha256Format
            | FileUploadConstraints::StorageKeyUnique
            | FileUploadConstraints::UpdatedAfterCreated
            | FileUploadConstraints::DeletedAfterCreated => {
                ErrorKind::InternalServerError.into_error()
            }
        };

        error.with_resource("file")
    }
}
