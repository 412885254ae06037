//! Tenancy agreement status enumeration.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Lifecycle status of a tenancy agreement.
///
/// This enumeration corresponds to the `TENANCY_STATUS` PostgreSQL enum.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[ExistingTypePath = "crate::schema::sql_types::TenancyStatus"]
pub enum TenancyStatus {
    /// Being prepared, not yet signed.
    #[db_rename = "draft"]
    #[serde(rename = "draft")]
    #[strum(serialize = "draft")]
    #[default]
    Draft,

    /// Signed and running.
    #[db_rename = "active"]
    #[serde(rename = "active")]
    #[strum(serialize = "active")]
    Active,

    /// Reached its end date.
    #[db_rename = "expired"]
    #[serde(rename = "expired")]
    #[strum(serialize = "expired")]
    Expired,

    /// Ended early by either party.
    #[db_rename = "terminated"]
    #[serde(rename = "terminated")]
    #[strum(serialize = "terminated")]
    Terminated,
}

impl TenancyStatus {
    /// Returns whether the tenancy can no longer change state.
    #[inline]
    pub fn is_final(self) -> bool {
        matches!(self, Self::Expired | Self::Terminated)
    }

    /// Returns whether a transition from `self` to `next` is allowed.
    pub fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (current, next) if current == next => true,
            (Self::Draft, Self::Active | Self::Terminated) => true,
            (Self::Active, Self::Expired | Self::Terminated) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_states_cannot_be_reopened() {
        assert!(!TenancyStatus::Terminated.can_transition_to(TenancyStatus::Active));
        assert!(!TenancyStatus::Expired.can_transition_to(TenancyStatus::Draft));
    }

    #[test]
    fn draft_can_be_activated() {
        assert!(TenancyStatus::Draft.can_transition_to(TenancyStatus::Active));
        assert!(TenancyStatus::Active.can_transition_to(TenancyStatus::Terminated));
        assert!(!TenancyStatus::Draft.can_transition_to(TenancyStatus::Expired));
    }
}
