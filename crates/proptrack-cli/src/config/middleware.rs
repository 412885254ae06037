//! Middleware configuration for the HTTP server.
//!
//! ```bash
//! proptrack --cors-origins "https://app.example.co.uk" --request-timeout 90
//! ```

use clap::Args;
use proptrack_server::middleware::{CorsConfig, OpenApiConfig, RecoveryConfig};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// CORS, OpenAPI and recovery settings.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Allowed origins and preflight caching.
    #[command(flatten)]
    pub cors: CorsConfig,

    /// Paths of the OpenAPI document and the Scalar UI.
    #[command(flatten)]
    pub openapi: OpenApiConfig,

    /// Request timeout.
    #[command(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            cors_origins = ?self.cors.allowed_origins,
            cors_credentials = self.cors.allow_credentials,
            openapi_path = %self.openapi.open_api_json,
            scalar_path = %self.openapi.scalar_ui,
            request_timeout_secs = self.recovery.request_timeout,
            "middleware configuration"
        );
    }
}
