//! Bearer token extraction.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};

use super::{AuthClaims, TRACING_TARGET_AUTHENTICATION};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::SessionKeys;

/// Verified claims of the `Authorization: Bearer` token.
///
/// Only checks the token itself. [`AuthState`] additionally checks that the
/// account still exists.
///
/// [`AuthState`]: crate::extract::AuthState
#[must_use]
#[derive(Debug, Clone)]
pub struct AuthHeader(AuthClaims);

impl AuthHeader {
    #[inline]
    pub fn as_auth_claims(&self) -> &AuthClaims {
        &self.0
    }

    #[inline]
    pub fn into_auth_claims(self) -> AuthClaims {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthHeader
where
    S: Sync + Send,
    SessionKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_header) = parts.extensions.get::<Self>() {
            return Ok(auth_header.clone());
        }

        type BearerHeader = TypedHeader<Authorization<Bearer>>;
        let bearer = BearerHeader::from_request_parts(parts, state)
            .await
            .map_err(|rejection| match rejection.reason() {
                TypedHeaderRejectionReason::Missing => ErrorKind::MissingAuthToken
                    .with_message("Authentication required")
                    .with_suggestion("Send an Authorization header with a Bearer token")
                    .with_resource("authentication"),
                _ => ErrorKind::MalformedAuthToken
                    .with_message("Invalid token format")
                    .with_context("Authorization header must contain a Bearer token")
                    .with_resource("authentication"),
            })?;

        let session_keys = SessionKeys::from_ref(state);
        let claims = AuthClaims::decode(bearer.token(), session_keys.decoding_key())
            .inspect_err(|error| {
                tracing::debug!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    error = %error,
                    "rejected bearer token"
                );
            })?;

        let auth_header = Self(claims);
        parts.extensions.insert(auth_header.clone());
        Ok(auth_header)
    }
}

impl From<JwtError> for Error<'static> {
    fn from(error: JwtError) -> Self {
        let error = match error.kind() {
            JwtErrorKind::ExpiredSignature => ErrorKind::Unauthorized
                .with_message("Authentication session has expired")
                .with_suggestion("Sign in again to continue"),
            JwtErrorKind::InvalidSignature => ErrorKind::Unauthorized
                .with_message("Authentication token verification failed"),
            JwtErrorKind::InvalidAudience | JwtErrorKind::InvalidIssuer => {
                ErrorKind::Unauthorized
                    .with_message("Authentication token was not issued for this service")
            }
            JwtErrorKind::InvalidAlgorithm => ErrorKind::MalformedAuthToken
                .with_message("Authentication token uses an unsupported algorithm"),
            JwtErrorKind::MissingRequiredClaim(claim) => ErrorKind::MalformedAuthToken
                .with_message("Authentication token is incomplete")
                .with_context(format!("missing claim: {claim}")),
            JwtErrorKind::InvalidKeyFormat | JwtErrorKind::InvalidRsaKey(_) => {
                ErrorKind::InternalServerError
                    .with_message("Authentication verification encountered an error")
                    .with_context(error.to_string())
            }
            _ => ErrorKind::MalformedAuthToken
                .with_message("Authentication token is invalid")
                .with_context(error.to_string()),
        };

        error.with_resource("authentication")
    }
}
