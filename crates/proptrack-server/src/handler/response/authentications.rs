//! Authentication response types.

use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Account;
use crate::extract::AuthClaims;

/// Response returned after successful authentication (login/signup).
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    /// The JWT for the `Authorization: Bearer` header.
    pub api_token: String,
    /// ID of the authenticated account.
    pub account_id: Uuid,
    /// ID of the token.
    pub token_id: Uuid,
    /// Timestamp when the token was issued.
    pub issued_at: Timestamp,
    /// Timestamp when the token expires.
    pub expires_at: Timestamp,
}

impl AuthToken {
    pub fn new(api_token: String, claims: &AuthClaims) -> Self {
        Self {
            api_token,
            account_id: claims.account_id,
            token_id: claims.token_id,
            issued_at: claims.issued_at,
            expires_at: claims.expires_at,
        }
    }
}

/// Response returned after signup.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    /// The newly created account.
    pub account: Account,
    /// Session token of the new account.
    pub token: AuthToken,
}
