//! Session tokens and authorization checks.
//!
//! - [`AuthClaims`]: claims of an HS256 session token
//! - [`AuthHeader`]: claims of the `Authorization: Bearer` header
//! - [`AuthState`]: claims verified against the accounts table
//! - [`AuthProvider`]: ownership and admin checks

mod auth_provider;
mod auth_state;
mod jwt_claims;
mod jwt_header;

pub use self::auth_provider::AuthProvider;
pub use self::auth_state::AuthState;
pub use self::jwt_claims::AuthClaims;
pub use self::jwt_header::AuthHeader;

/// Tracing target for token verification.
pub const TRACING_TARGET_AUTHENTICATION: &str = "proptrack_server::authentication";

/// Tracing target for ownership and admin checks.
pub const TRACING_TARGET_AUTHORIZATION: &str = "proptrack_server::authorization";

impl AuthProvider for AuthClaims {
    fn account_id(&self) -> uuid::Uuid {
        self.account_id
    }

    fn is_admin(&self) -> bool {
        self.is_administrator
    }
}

impl AuthProvider for AuthState {
    fn account_id(&self) -> uuid::Uuid {
        self.0.account_id
    }

    fn is_admin(&self) -> bool {
        self.0.is_administrator
    }
}
