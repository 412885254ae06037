//! Financial transaction direction and category enumerations.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Direction of money for a transaction.
///
/// This enumeration corresponds to the `TRANSACTION_TYPE` PostgreSQL enum.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[ExistingTypePath = "crate::schema::sql_types::TransactionType"]
pub enum TransactionType {
    #[db_rename = "income"]
    #[serde(rename = "income")]
    #[strum(serialize = "income")]
    Income,

    #[db_rename = "expense"]
    #[serde(rename = "expense")]
    #[strum(serialize = "expense")]
    Expense,
}

/// Bookkeeping category of a transaction.
///
/// This enumeration corresponds to the `TRANSACTION_CATEGORY` PostgreSQL enum.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[ExistingTypePath = "crate::schema::sql_types::TransactionCategory"]
pub enum TransactionCategory {
    #[db_rename = "rent"]
    #[serde(rename = "rent")]
    #[strum(serialize = "rent")]
    Rent,

    #[db_rename = "deposit"]
    #[serde(rename = "deposit")]
    #[strum(serialize = "deposit")]
    Deposit,

    #[db_rename = "maintenance"]
    #[serde(rename = "maintenance")]
    #[strum(serialize = "maintenance")]
    Maintenance,

    #[db_rename = "utilities"]
    #[serde(rename = "utilities")]
    #[strum(serialize = "utilities")]
    Utilities,

    #[db_rename = "insurance"]
    #[serde(rename = "insurance")]
    #[strum(serialize = "insurance")]
    Insurance,

    #[db_rename = "mortgage"]
    #[serde(rename = "mortgage")]
    #[strum(serialize = "mortgage")]
    Mortgage,

    #[db_rename = "tax"]
    #[serde(rename = "tax")]
    #[strum(serialize = "tax")]
    Tax,

    #[db_rename = "fees"]
    #[serde(rename = "fees")]
    #[strum(serialize = "fees")]
    Fees,

    #[db_rename = "sale"]
    #[serde(rename = "sale")]
    #[strum(serialize = "sale")]
    Sale,

    #[db_rename = "purchase"]
    #[serde(rename = "purchase")]
    #[strum(serialize = "purchase")]
    Purchase,

    #[db_rename = "other"]
    #[serde(rename = "other")]
    #[strum(serialize = "other")]
    #[default]
    Other,
}
