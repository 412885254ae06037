//! Account constraint violation error handlers.

use proptrack_postgres::types::AccountConstraints;

use crate::handler::{Error, ErrorKind};

impl From<AccountConstraints> for Error<'static> {
    fn from(c: AccountConstraints) -> Self {
        let error = match c {
            AccountConstraints::DisplayNameLength => ErrorKind::BadRequest
                .with_message("Display name must be between 2 and 64 characters long"),
            AccountConstraints::EmailAddressFormat => {
                ErrorKind::BadRequest.with_message("Invalid email format")
            }
            AccountConstraints::EmailAddressLowercase => {
                ErrorKind::BadRequest.with_message("Email address must be lower case")
            }
            AccountConstraints::EmailAddressUnique => ErrorKind::Conflict
                .with_message("An account with this email address already exists"),
            AccountConstraints::UpdatedAfterCreated | AccountConstraints::DeletedAfterCreated => {
                ErrorKind::InternalServerError.into_error()
            }
        };

        error.with_resource("account")
    }
}
