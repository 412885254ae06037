//! Panic recovery and request timeouts.

use std::any::Any;
use std::future::ready;
use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::response::{IntoResponse, Response};
#[cfg(feature = "config")]
use clap::Args;
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower_http::catch_panic::CatchPanicLayer;

use crate::handler::{Error, ErrorKind};

/// Tracing target for middleware errors.
const TRACING_TARGET_ERROR: &str = "proptrack_server::middleware::recovery";

/// Tracing target for caught panics.
const TRACING_TARGET_PANIC: &str = "proptrack_server::middleware::panic";

type ResponseFut = BoxFuture<'static, Response>;
type Panic = Box<dyn Any + Send + 'static>;

/// Configuration for the recovery middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct RecoveryConfig {
    /// Seconds a request may take before it is aborted.
    ///
    /// Imports run in the background, so this only bounds the upload itself.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "REQUEST_TIMEOUT", default_value = "60")
    )]
    pub request_timeout: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            request_timeout: 60,
        }
    }
}

impl RecoveryConfig {
    /// Creates a configuration with the given timeout in seconds.
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self {
            request_timeout: secs,
        }
    }

    /// Returns the request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Extension trait for `axum::`[`Router`] to apply recovery middleware.
pub trait RouterRecoveryExt<S> {
    /// Converts panics, timeouts and layer errors into JSON error responses.
    fn with_recovery(self, config: &RecoveryConfig) -> Self;

    /// Same as [`with_recovery`] with [`RecoveryConfig::default`].
    ///
    /// [`with_recovery`]: RouterRecoveryExt::with_recovery
    fn with_default_recovery(self) -> Self;
}

impl<S> RouterRecoveryExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_recovery(self, config: &RecoveryConfig) -> Self {
        let middlewares = ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_error))
            .layer(CatchPanicLayer::custom(catch_panic))
            .layer(TimeoutLayer::new(config.request_timeout()));

        self.layer(middlewares)
    }

    fn with_default_recovery(self) -> Self {
        self.with_recovery(&RecoveryConfig::default())
    }
}

fn handle_error(err: tower::BoxError) -> ResponseFut {
    use tower::timeout::error::Elapsed;

    let error = if err.is::<Elapsed>() {
        tracing::error!(
            target: TRACING_TARGET_ERROR,
            error = %err,
            "request timeout exceeded"
        );

        Error::new(ErrorKind::InternalServerError)
            .with_message("Request timeout")
            .with_context("The request took too long to process and was terminated")
    } else {
        tracing::error!(
            target: TRACING_TARGET_ERROR,
            error = %err,
            "unhandled middleware error"
        );

        Error::new(ErrorKind::InternalServerError).with_message("An unexpected error occurred")
    };

    ready(error.into_response()).boxed()
}

fn catch_panic(err: Panic) -> Response {
    if let Some(error) = err.downcast_ref::<Error>() {
        tracing::error!(target: TRACING_TARGET_PANIC, error = %error, "handler panicked");
        return error.clone().into_response();
    }

    let message = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");

    tracing::error!(target: TRACING_TARGET_PANIC, message, "handler panicked");

    Error::new(ErrorKind::InternalServerError)
        .with_message("An unexpected error occurred")
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum_test::TestServer;

    use super::*;

    async fn panicking() -> &'static str {
        panic!("handler failure")
    }

    #[tokio::test]
    async fn panics_become_internal_errors() -> anyhow::Result<()> {
        let app: Router = Router::new()
            .route("/panic/", get(panicking))
            .route("/ok/", get(|| async { "ok" }))
            .with_default_recovery();

        let server = TestServer::new(app)?;

        let response = server.get("/panic/").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

        let response = server.get("/ok/").await;
        response.assert_status_ok();
        response.assert_text("ok");
        Ok(())
    }

    #[test]
    fn timeout_is_in_seconds() {
        let config = RecoveryConfig::with_timeout_secs(5);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }
}
