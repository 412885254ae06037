//! Account request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validations::validate_display_name_format;

/// Request payload to update the caller's account.
///
/// Changing the password requires the current one.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccount {
    /// New display name (2-100 characters).
    #[validate(length(min = 2, max = 100))]
    #[validate(custom(function = "validate_display_name_format"))]
    pub display_name: Option<String>,

    /// New email address.
    #[validate(email)]
    #[validate(length(min = 5, max = 254))]
    pub email_address: Option<String>,

    /// New password (will be hashed before storage).
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,

    /// Current password, required together with `password`.
    #[validate(length(min = 1, max = 1000))]
    pub current_password: Option<String>,
}

impl UpdateAccount {
    /// Email address as stored and compared.
    pub fn normalized_email(&self) -> Option<String> {
        self.email_address
            .as_deref()
            .map(|email| email.trim().to_lowercase())
    }
}
