//! Property and Land Registry import constraint violation error handlers.

use proptrack_postgres::types::{LandRegistryImportConstraints, PropertyConstraints};

use crate::handler::{Error, ErrorKind};

impl From<PropertyConstraints> for Error<'static> {
    fn from(c: PropertyConstraints) -> Self {
        let error = match c {
            PropertyConstraints::PaonNotEmpty => ErrorKind::BadRequest
                .with_message("House number or name cannot be empty"),
            PropertyConstraints::TownNotEmpty => {
                ErrorKind::BadRequest.with_message("Town cannot be empty")
            }
            PropertyConstraints::PostcodeFormat => ErrorKind::BadRequest
                .with_message("Postcode is not a valid UK postcode")
                .with_suggestion("Use the full postcode, e.g. SW1A 1AA"),
            PropertyConstraints::BedroomsRange => {
                ErrorKind::BadRequest.with_message("Bedrooms must be between 0 and 50")
            }
            PropertyConstraints::BathroomsRange => {
                ErrorKind::BadRequest.with_message("Bathrooms must be between 0 and 50")
            }
            PropertyConstraints::FloorAreaPositive => {
                ErrorKind::BadRequest.with_message("Floor area must be positive")
            }
            PropertyConstraints::AskingPricePositive => {
                ErrorKind::BadRequest.with_message("Asking price must be positive")
            }
            PropertyConstraints::MonthlyRentPositive => {
                ErrorKind::BadRequest.with_message("Monthly rent must be positive")
            }
            PropertyConstraints::LastSalePricePositive => {
                ErrorKind::BadRequest.with_message("Sale price must be positive")
            }
            PropertyConstraints::PpdCategoryValues => {
                ErrorKind::BadRequest.with_message("Price Paid category must be A or B")
            }
            PropertyConstraints::LandRegistryTransactionIdUnique => ErrorKind::Conflict
                .with_message("Another property already records this Land Registry transaction"),
            PropertyConstraints::UpdatedAfterCreated | PropertyConstraints::DeletedAfterCreated => {
                ErrorKind::InternalServerError.into_error()
            }
        };

        error.with_resource("property")
    }
}

impl From<LandRegistryImportConstraints> for Error<'static> {
    fn from(c: LandRegistryImportConstraints) -> Self {
        let error = match c {
            LandRegistryImportConstraints::FileNameLength => ErrorKind::BadRequest
                .with_message("File name must be between 1 and 255 characters long"),
            LandRegistryImportConstraints::BatchSizeRange => {
                ErrorKind::BadRequest.with_message("Batch size must be between 1 and 5000")
            }
            LandRegistryImportConstraints::CountersNonNegative
            | LandRegistryImportConstraints::RowErrorsArray
            | LandRegistryImportConstraints::CompletedAfterStarted
            | LandRegistryImportConstraints::UpdatedAfterCreated => {
                ErrorKind::InternalServerError.into_error()
            }
        };

        error.with_resource("import")
    }
}
