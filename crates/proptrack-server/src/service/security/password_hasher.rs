//! Password hashing and verification with Argon2id.
//!
//! Hashing and verification return handler errors directly, so signup and
//! login can propagate them with `?`.

use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier};
use rand::rngs::OsRng;

use crate::handler::{ErrorKind, Result};

const TRACING_TARGET: &str = "proptrack_server::service::password_hasher";

/// Argon2id password hasher with the default parameters.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Hashes `password` with a fresh random salt.
    ///
    /// The result is a PHC string that embeds the algorithm, parameters and
    /// salt, ready to be stored in `accounts.password_hash`.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::try_from_rng(&mut OsRng).map_err(|e| {
            tracing::error!(target: TRACING_TARGET, error = %e, "salt generation failed");
            ErrorKind::InternalServerError
                .with_message("Password processing failed")
                .with_context("Salt generation error")
                .with_resource("authentication")
        })?;

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(target: TRACING_TARGET, error = %e, "password hashing failed");
                ErrorKind::InternalServerError
                    .with_message("Password processing failed")
                    .with_context("Hash generation error")
                    .with_resource("authentication")
            })?;

        Ok(password_hash.to_string())
    }

    /// Verifies `password` against a stored PHC hash.
    ///
    /// A wrong password yields `401 Unauthorized`; a corrupt hash yields
    /// `500 Internal Server Error`.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<()> {
        let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
            tracing::warn!(target: TRACING_TARGET, error = %e, "stored password hash is malformed");
            ErrorKind::InternalServerError
                .with_message("Authentication temporarily unavailable")
                .with_context("Hash format error")
                .with_resource("authentication")
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(()),
            Err(ArgonError::Password) => {
                tracing::debug!(target: TRACING_TARGET, "password verification failed");
                Err(ErrorKind::Unauthorized
                    .with_message("Invalid email address or password")
                    .with_resource("authentication"))
            }
            Err(e) => {
                tracing::error!(target: TRACING_TARGET, error = %e, "password verification error");
                Err(ErrorKind::InternalServerError
                    .with_message("Authentication temporarily unavailable")
                    .with_context("Verification error")
                    .with_resource("authentication"))
            }
        }
    }

    /// Spends the same work as a real verification against a random hash.
    ///
    /// Used on login for unknown email addresses so response timing does not
    /// reveal which accounts exist. Always returns `false`.
    pub fn verify_dummy_password(&self, password: &str) -> bool {
        use rand::Rng;

        let length = rand::random_range(16..32);
        let dummy: String = (0..length)
            .map(|_| rand::rng().sample(rand::distr::Alphanumeric) as char)
            .collect();

        if let Ok(dummy_hash) = self.hash_password(&dummy) {
            let _ = self.verify_password(password, &dummy_hash);
        }

        false
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_password() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("correct horse battery")?;

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("correct horse battery", &hash).is_ok());
        Ok(())
    }

    #[test]
    fn hashes_are_salted() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new();
        let first = hasher.hash_password("landlord-password")?;
        let second = hasher.hash_password("landlord-password")?;

        assert_ne!(first, second);
        Ok(())
    }

    #[test]
    fn wrong_password_is_unauthorized() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("right-password")?;

        let Err(error) = hasher.verify_password("wrong-password", &hash) else {
            anyhow::bail!("wrong password verified");
        };
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        Ok(())
    }

    #[test]
    fn malformed_hash_is_internal_error() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new();

        let Err(error) = hasher.verify_password("password", "not-a-phc-string") else {
            anyhow::bail!("malformed hash verified");
        };
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        Ok(())
    }

    #[test]
    fn dummy_verification_never_succeeds() {
        let hasher = PasswordHasher::new();
        assert!(!hasher.verify_dummy_password("anything"));
    }
}
