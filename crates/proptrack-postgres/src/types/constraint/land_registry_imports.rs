//! Constraints of the `land_registry_imports` table.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Named constraints and unique indexes of `land_registry_imports`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum LandRegistryImportConstraints {
    #[strum(serialize = "land_registry_imports_file_name_length")]
    FileNameLength,
    #[strum(serialize = "land_registry_imports_batch_size_range")]
    BatchSizeRange,
    #[strum(serialize = "land_registry_imports_counters_non_negative")]
    CountersNonNegative,
    #[strum(serialize = "land_registry_imports_row_errors_array")]
    RowErrorsArray,

    #[strum(serialize = "land_registry_imports_completed_after_started")]
    CompletedAfterStarted,
    #[strum(serialize = "land_registry_imports_updated_after_created")]
    UpdatedAfterCreated,
}

impl LandRegistryImportConstraints {
    /// Parses a constraint name reported by PostgreSQL.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::FileNameLength
            | Self::BatchSizeRange
            | Self::CountersNonNegative
            | Self::RowErrorsArray => ConstraintCategory::Validation,
            Self::CompletedAfterStarted
            | Self::UpdatedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<LandRegistryImportConstraints> for String {
    #[inline]
    fn from(value: LandRegistryImportConstraints) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for LandRegistryImportConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
