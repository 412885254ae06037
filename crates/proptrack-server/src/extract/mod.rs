//! Request extractors that reject with [`ErrorResponse`] bodies.
//!
//! [`ErrorResponse`]: crate::handler::response::ErrorResponse

pub mod auth;
mod pg_connection;
pub mod reject;

pub use crate::extract::auth::{
    AuthClaims, AuthHeader, AuthProvider, AuthState, TRACING_TARGET_AUTHENTICATION,
    TRACING_TARGET_AUTHORIZATION,
};
pub use crate::extract::pg_connection::PgPool;
pub use crate::extract::reject::{Json, Multipart, Path, Query, ValidateJson};
