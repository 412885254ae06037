//! Authenticated caller, verified against the database.
//!
//! A signed token alone is not enough: the account may have been deleted or
//! had its admin flag changed since the token was issued. [`AuthState`]
//! looks the account up once per request and caches the result in the
//! request extensions, so both the `require_authentication` middleware and
//! the handler can extract it.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use derive_more::Deref;
use proptrack_postgres::PgClient;
use proptrack_postgres::model::Account;
use proptrack_postgres::query::AccountRepository;

use super::{AuthClaims, AuthHeader, TRACING_TARGET_AUTHENTICATION};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::SessionKeys;

/// Verified claims of the calling account.
#[derive(Debug, Clone, Deref, PartialEq, Eq)]
pub struct AuthState(pub AuthClaims);

impl AuthState {
    /// Wraps claims that have already been checked against the database.
    #[inline]
    #[must_use]
    pub const fn from_verified_claims(auth_claims: AuthClaims) -> Self {
        Self(auth_claims)
    }

    /// Checks that the token's account is live and its admin flag is current.
    pub async fn from_unverified_header(
        auth_header: AuthHeader,
        pg_client: &PgClient,
    ) -> Result<Self> {
        let claims = auth_header.into_auth_claims();

        let mut conn = pg_client.get_connection().await.map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %e,
                account_id = %claims.account_id,
                "database unavailable during authentication"
            );
            ErrorKind::InternalServerError
                .with_message("Authentication is temporarily unavailable")
                .with_context(e.to_string())
        })?;

        let account = conn
            .find_account_by_id(claims.account_id)
            .await?
            .filter(|account| !account.is_deleted())
            .ok_or_else(|| {
                tracing::warn!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    account_id = %claims.account_id,
                    token_id = %claims.token_id,
                    "token refers to a missing account"
                );
                ErrorKind::Unauthorized
                    .with_message("Account not found")
                    .with_suggestion("Sign in again to continue")
                    .with_resource("authentication")
            })?;

        Self::verify_privilege_consistency(&claims, &account)?;

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            account_id = %claims.account_id,
            is_admin = account.is_admin,
            "authentication verified"
        );

        Ok(Self::from_verified_claims(claims))
    }

    fn verify_privilege_consistency(claims: &AuthClaims, account: &Account) -> Result<()> {
        if claims.is_administrator != account.is_admin {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                account_id = %claims.account_id,
                token_admin = claims.is_administrator,
                account_admin = account.is_admin,
                "admin flag changed since the token was issued"
            );
            return Err(ErrorKind::Unauthorized
                .with_message("Your account privileges have changed")
                .with_suggestion("Sign in again to refresh your session")
                .with_resource("authentication"));
        }

        Ok(())
    }
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Sync + Send,
    PgClient: FromRef<S>,
    SessionKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_state) = parts.extensions.get::<Self>() {
            return Ok(auth_state.clone());
        }

        let auth_header = AuthHeader::from_request_parts(parts, state).await?;
        let pg_client = PgClient::from_ref(state);
        let auth_state = Self::from_unverified_header(auth_header, &pg_client).await?;

        parts.extensions.insert(auth_state.clone());
        Ok(auth_state)
    }
}

impl aide::OperationInput for AuthState {}
