//! Request ids and per-request trace spans.

use std::time::Instant;

use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderName, header};
use axum::middleware::{Next, from_fn};
use axum::response::Response;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

/// Tracing target for request timings.
const TRACING_TARGET: &str = "proptrack_server::middleware::requests";

/// Header carrying the request id.
const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Extension trait for `axum::`[`Router`] to apply observability middleware.
pub trait RouterObservabilityExt<S> {
    /// Assigns every request an `x-request-id`, echoes it in the response,
    /// opens a trace span and logs the request duration.
    ///
    /// `Authorization` and `Cookie` headers are redacted from logs.
    fn with_observability(self) -> Self;
}

impl<S> RouterObservabilityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_observability(self) -> Self {
        self.layer(from_fn(log_request_timing))
            .layer(PropagateRequestIdLayer::new(REQUEST_ID))
            .layer(SetSensitiveRequestHeadersLayer::new([
                header::AUTHORIZATION,
                header::COOKIE,
            ]))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(REQUEST_ID, MakeRequestUuid))
    }
}

async fn log_request_timing(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let request_id = request
        .headers()
        .get(&REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    let response = next.run(request).await;

    tracing::debug!(
        target: TRACING_TARGET,
        %method,
        path,
        request_id,
        status = response.status().as_u16(),
        duration_ms = started.elapsed().as_millis() as u64,
        "request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use axum_test::TestServer;

    use super::*;

    #[tokio::test]
    async fn responses_carry_a_request_id() -> anyhow::Result<()> {
        let app: Router = Router::new()
            .route("/ping/", get(|| async { "pong" }))
            .with_observability();

        let server = TestServer::new(app)?;
        let response = server.get("/ping/").await;
        response.assert_status_ok();

        let request_id = response.header(REQUEST_ID);
        assert!(!request_id.is_empty());
        Ok(())
    }
}
