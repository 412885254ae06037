//! Authentication request types.

use proptrack_postgres::model::NewAccount;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validations::validate_display_name_format;

/// Request payload for login.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Login {
    /// Email address of the account.
    #[validate(email)]
    #[validate(length(min = 5, max = 254))]
    pub email_address: String,

    /// Password of the account.
    #[validate(length(min = 1, max = 1000))]
    pub password: String,
}

/// Request payload for signup.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Signup {
    /// Display name of the account (2-100 characters).
    #[validate(length(min = 2, max = 100))]
    #[validate(custom(function = "validate_display_name_format"))]
    pub display_name: String,

    /// Email address of the account, stored lower-cased.
    #[validate(email)]
    #[validate(length(min = 5, max = 254))]
    pub email_address: String,

    /// Password of the account.
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

impl Signup {
    /// Email address as stored and compared.
    pub fn normalized_email(&self) -> String {
        self.email_address.trim().to_lowercase()
    }

    /// Converts this request into a database model.
    pub fn into_model(self, password_hash: String) -> NewAccount {
        NewAccount {
            email_address: self.normalized_email(),
            display_name: self.display_name.trim().to_owned(),
            password_hash,
            is_admin: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_normalises_email() {
        let signup = Signup {
            display_name: " Nell Dean ".into(),
            email_address: " Nell.Dean@Example.CO.UK ".into(),
            password: "wuthering-heights".into(),
        };

        let account = signup.into_model("hash".into());
        assert_eq!(account.email_address, "nell.dean@example.co.uk");
        assert_eq!(account.display_name, "Nell Dean");
        assert_eq!(account.is_admin, None);
    }

    #[test]
    fn short_password_is_rejected() {
        let signup = Signup {
            display_name: "Nell Dean".into(),
            email_address: "nell@example.co.uk".into(),
            password: "short".into(),
        };

        assert!(signup.validate().is_err());
    }
}
