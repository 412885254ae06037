//! HMAC keys and lifetime of session tokens.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "config")]
use clap::Args;
use jiff::SignedDuration;
use jsonwebtoken::{DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const TRACING_TARGET: &str = "proptrack_server::service::session_keys";

/// Shortest accepted signing secret, in bytes.
const MIN_SECRET_LENGTH: usize = 32;

/// Session token configuration.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct SessionKeysConfig {
    /// Secret used to sign and verify HS256 session tokens.
    #[cfg_attr(feature = "config", arg(long = "jwt-secret", env = "JWT_SECRET"))]
    pub jwt_secret: String,

    /// Lifetime of an issued session token in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long = "session-lifetime-secs", env = "SESSION_LIFETIME_SECS", default_value_t = 86_400)
    )]
    #[serde(default = "SessionKeysConfig::default_lifetime_secs")]
    pub session_lifetime_secs: u64,
}

impl SessionKeysConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            session_lifetime_secs: Self::default_lifetime_secs(),
        }
    }

    fn default_lifetime_secs() -> u64 {
        86_400
    }

    /// Checks the secret length and the token lifetime.
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.len() < MIN_SECRET_LENGTH {
            return Err(Error::config(format!(
                "JWT secret must be at least {MIN_SECRET_LENGTH} bytes long"
            )));
        }

        if self.session_lifetime_secs < 60 {
            return Err(Error::config("Session lifetime must be at least 60 seconds"));
        }

        if self.session_lifetime_secs > 30 * 86_400 {
            return Err(Error::config("Session lifetime cannot exceed 30 days"));
        }

        Ok(())
    }
}

impl fmt::Debug for SessionKeysConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeysConfig")
            .field("jwt_secret", &"***")
            .field("session_lifetime_secs", &self.session_lifetime_secs)
            .finish()
    }
}

/// Signing keys for session tokens, cheap to clone.
#[derive(Clone)]
pub struct SessionKeys {
    inner: Arc<SessionKeysInner>,
}

struct SessionKeysInner {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    lifetime: SignedDuration,
}

impl SessionKeys {
    /// Derives both keys from the configured secret.
    pub fn from_config(config: &SessionKeysConfig) -> Result<Self> {
        config.validate()?;

        let secret = config.jwt_secret.as_bytes();
        let lifetime_secs = i64::try_from(config.session_lifetime_secs)
            .map_err(|_| Error::config("Session lifetime is out of range"))?;

        tracing::info!(
            target: TRACING_TARGET,
            lifetime_secs,
            "session keys initialized"
        );

        Ok(Self {
            inner: Arc::new(SessionKeysInner {
                decoding_key: DecodingKey::from_secret(secret),
                encoding_key: EncodingKey::from_secret(secret),
                lifetime: SignedDuration::from_secs(lifetime_secs),
            }),
        })
    }

    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }

    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }

    /// How long newly issued tokens stay valid.
    #[inline]
    pub fn session_lifetime(&self) -> SignedDuration {
        self.inner.lifetime
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("lifetime", &self.inner.lifetime)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secret_is_rejected() {
        let config = SessionKeysConfig::new("too-short");
        assert!(SessionKeys::from_config(&config).is_err());
    }

    #[test]
    fn lifetime_is_bounded() {
        let mut config = SessionKeysConfig::new("a".repeat(48));
        config.session_lifetime_secs = 10;
        assert!(config.validate().is_err());

        config.session_lifetime_secs = 3_600;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn keys_carry_the_configured_lifetime() -> anyhow::Result<()> {
        let mut config = SessionKeysConfig::new("k".repeat(32));
        config.session_lifetime_secs = 7_200;

        let keys = SessionKeys::from_config(&config)?;
        assert_eq!(keys.session_lifetime(), SignedDuration::from_hours(2));
        Ok(())
    }

    #[test]
    fn debug_hides_the_secret() {
        let config = SessionKeysConfig::new("super-secret-signing-key-material!!");
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
