use std::borrow::Cow;

use jiff::Timestamp;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use proptrack_postgres::model::Account;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{ErrorKind, Result};
use crate::service::SessionKeys;

/// Claims of a session token.
///
/// | Claim | Field | Description |
/// |-------|-------|-------------|
/// | `iss` | `issued_by` | Always `proptrack` |
/// | `aud` | `audience` | Always `proptrack:api` |
/// | `jti` | `token_id` | Random token identifier |
/// | `sub` | `account_id` | Account the token was issued to |
/// | `iat` | `issued_at` | Issue time, seconds since the epoch |
/// | `exp` | `expires_at` | Expiry time, seconds since the epoch |
/// | `adm` | `is_administrator` | Admin flag at issue time |
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthClaims {
    #[serde(rename = "iss")]
    issued_by: Cow<'static, str>,
    #[serde(rename = "aud")]
    audience: Cow<'static, str>,

    #[serde(rename = "jti")]
    pub token_id: Uuid,
    #[serde(rename = "sub")]
    pub account_id: Uuid,

    #[serde(rename = "iat", with = "jiff::fmt::serde::timestamp::second::required")]
    pub issued_at: Timestamp,
    #[serde(rename = "exp", with = "jiff::fmt::serde::timestamp::second::required")]
    pub expires_at: Timestamp,

    #[serde(rename = "adm")]
    pub is_administrator: bool,
}

impl AuthClaims {
    const JWT_AUDIENCE: &str = "proptrack:api";
    const JWT_ISSUER: &str = "proptrack";

    /// Issues claims for `account`, valid for the configured session lifetime.
    pub fn new(account: &Account, session_keys: &SessionKeys) -> Result<Self> {
        let issued_at = Timestamp::now();
        let expires_at = issued_at
            .checked_add(session_keys.session_lifetime())
            .map_err(|e| {
                ErrorKind::InternalServerError
                    .with_message("Authentication token generation failed")
                    .with_context(format!("Invalid session lifetime: {e}"))
                    .with_resource("authentication")
            })?;

        Ok(Self {
            issued_by: Cow::Borrowed(Self::JWT_ISSUER),
            audience: Cow::Borrowed(Self::JWT_AUDIENCE),
            token_id: Uuid::new_v4(),
            account_id: account.id,
            issued_at,
            expires_at,
            is_administrator: account.is_admin,
        })
    }

    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Timestamp::now()
    }

    /// Signs the claims into a compact HS256 token.
    pub fn encode(&self, encoding_key: &EncodingKey) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), self, encoding_key).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %e,
                account_id = %self.account_id,
                "failed to encode session token"
            );

            ErrorKind::InternalServerError
                .with_message("Authentication token generation failed")
                .with_resource("authentication")
        })
    }

    /// Verifies the signature, issuer, audience and expiry of `token`.
    pub fn decode(token: &str, decoding_key: &DecodingKey) -> Result<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_audience(&[Self::JWT_AUDIENCE]);
        validation.set_issuer(&[Self::JWT_ISSUER]);
        validation.set_required_spec_claims(&["iss", "aud", "jti", "sub", "iat", "exp"]);

        let claims = decode::<Self>(token, decoding_key, &validation)?.claims;

        if claims.is_expired() {
            return Err(ErrorKind::Unauthorized
                .with_message("Authentication session has expired")
                .with_suggestion("Sign in again to continue")
                .with_resource("authentication"));
        }

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            token_id = %claims.token_id,
            account_id = %claims.account_id,
            is_admin = claims.is_administrator,
            "session token verified"
        );

        Ok(claims)
    }
}

#[cfg(test)]
impl AuthClaims {
    /// Claims for `account_id`, valid for an hour.
    pub(crate) fn for_account(account_id: Uuid, is_administrator: bool) -> Self {
        let issued_at = Timestamp::now();
        Self {
            issued_by: Cow::Borrowed(Self::JWT_ISSUER),
            audience: Cow::Borrowed(Self::JWT_AUDIENCE),
            token_id: Uuid::new_v4(),
            account_id,
            issued_at,
            expires_at: issued_at + jiff::SignedDuration::from_hours(1),
            is_administrator,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptrack_postgres::model::Account;

    use super::*;
    use crate::service::SessionKeysConfig;

    fn session_keys(secret: &str) -> anyhow::Result<SessionKeys> {
        Ok(SessionKeys::from_config(&SessionKeysConfig::new(secret))?)
    }

    fn account(is_admin: bool) -> Account {
        let now = Timestamp::now();
        Account {
            id: Uuid::new_v4(),
            display_name: "Margaret Hale".into(),
            email_address: "margaret@example.co.uk".into(),
            password_hash: String::new(),
            is_admin,
            created_at: now.into(),
            updated_at: now.into(),
            deleted_at: None,
        }
    }

    #[test]
    fn token_roundtrip_keeps_claims() -> anyhow::Result<()> {
        let keys = session_keys("0123456789abcdef0123456789abcdef")?;
        let account = account(true);

        let claims = AuthClaims::new(&account, &keys)?;
        let token = claims.encode(keys.encoding_key())?;
        let decoded = AuthClaims::decode(&token, keys.decoding_key())?;

        assert_eq!(decoded.account_id, account.id);
        assert!(decoded.is_administrator);
        assert_eq!(decoded.token_id, claims.token_id);
        Ok(())
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() -> anyhow::Result<()> {
        let keys = session_keys("0123456789abcdef0123456789abcdef")?;
        let other = session_keys("fedcba9876543210fedcba9876543210")?;

        let token = AuthClaims::new(&account(false), &other)?.encode(other.encoding_key())?;
        let Err(error) = AuthClaims::decode(&token, keys.decoding_key()) else {
            anyhow::bail!("foreign token accepted");
        };
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        Ok(())
    }

    #[test]
    fn expired_token_is_rejected() -> anyhow::Result<()> {
        let keys = session_keys("0123456789abcdef0123456789abcdef")?;
        let mut claims = AuthClaims::new(&account(false), &keys)?;
        claims.issued_at = Timestamp::from_second(1_600_000_000)?;
        claims.expires_at = Timestamp::from_second(1_600_003_600)?;

        let token = claims.encode(keys.encoding_key())?;
        assert!(AuthClaims::decode(&token, keys.decoding_key()).is_err());
        Ok(())
    }

    #[test]
    fn garbage_is_malformed() -> anyhow::Result<()> {
        let keys = session_keys("0123456789abcdef0123456789abcdef")?;
        let Err(error) = AuthClaims::decode("not.a.token", keys.decoding_key()) else {
            anyhow::bail!("garbage accepted");
        };
        assert_eq!(error.kind(), ErrorKind::MalformedAuthToken);
        Ok(())
    }
}
