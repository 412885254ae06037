//! Constraints of the `accounts` table.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Named constraints and unique indexes of `accounts`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum AccountConstraints {
    #[strum(serialize = "accounts_display_name_length")]
    DisplayNameLength,
    #[strum(serialize = "accounts_email_address_format")]
    EmailAddressFormat,
    #[strum(serialize = "accounts_email_address_lowercase")]
    EmailAddressLowercase,

    #[strum(serialize = "accounts_email_address_unique")]
    EmailAddressUnique,

    #[strum(serialize = "accounts_updated_after_created")]
    UpdatedAfterCreated,
    #[strum(serialize = "accounts_deleted_after_created")]
    DeletedAfterCreated,
}

impl AccountConstraints {
    /// Parses a constraint name reported by PostgreSQL.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::DisplayNameLength
            | Self::EmailAddressFormat
            | Self::EmailAddressLowercase => ConstraintCategory::Validation,
            Self::EmailAddressUnique => ConstraintCategory::Uniqueness,
            Self::UpdatedAfterCreated
            | Self::DeletedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<AccountConstraints> for String {
    #[inline]
    fn from(value: AccountConstraints) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for AccountConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
