//! Account models.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::accounts;

/// Landlord, agent or administrator able to sign in.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Account {
    pub id: Uuid,
    /// Name shown in the UI (2-100 characters).
    pub display_name: String,
    /// Lower-case email address, unique among live accounts.
    pub email_address: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Administrators may read and change every record.
    pub is_admin: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// New account.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAccount {
    pub display_name: String,
    pub email_address: String,
    pub password_hash: String,
    /// `None` uses the column default (`false`).
    pub is_admin: Option<bool>,
}

/// Changes to an account. `None` leaves the column untouched.
#[derive(Debug, Default, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateAccount {
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    pub password_hash: Option<String>,
}

impl Account {
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
