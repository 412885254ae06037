//! Middleware for `axum::Router` and HTTP request processing.
//!
//! Each concern is an extension trait on [`Router`]:
//!
//! - [`RouterRecoveryExt`]: panic recovery and request timeouts
//! - [`RouterObservabilityExt`]: request ids and trace spans
//! - [`RouterSecurityExt`]: CORS, body limits, compression and headers
//! - [`RouterOpenApiExt`]: OpenAPI document and Scalar UI
//! - [`RouterAuthExt`]: session token check
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum::Router;
//! use proptrack_server::middleware::{
//!     RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt,
//! };
//!
//! let app: Router = Router::new()
//!     .with_default_security()
//!     .with_observability()
//!     .with_default_recovery();
//! ```
//!
//! [`Router`]: axum::Router

mod authentication;
mod constants;
mod observability;
mod recovery;
mod security;
mod specification;

pub use authentication::{RouterAuthExt, require_authentication};
pub use constants::DEFAULT_MAX_BODY_SIZE;
pub use observability::RouterObservabilityExt;
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{
    CorsConfig, FrameOptions, ReferrerPolicy, RouterSecurityExt, SecurityHeadersConfig,
};
pub use specification::{OpenApiConfig, RouterOpenApiExt};
