//! Health check handler.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use proptrack_postgres::PgClient;

use crate::extract::Json;
use crate::handler::response::MonitorStatus;
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "proptrack_server::handler::monitors";

/// Reports database reachability and connection pool usage.
///
/// Answers `503 Service Unavailable` when the database cannot be reached,
/// so load balancers can take the instance out of rotation.
#[tracing::instrument(skip_all)]
async fn health_status(State(pg_client): State<PgClient>) -> (StatusCode, Json<MonitorStatus>) {
    let is_reachable = match pg_client.ping().await {
        Ok(()) => true,
        Err(error) => {
            tracing::warn!(target: TRACING_TARGET, error = %error, "database health check failed");
            false
        }
    };

    let response = MonitorStatus::new(is_reachable, pg_client.pool_status());
    let status_code = if is_reachable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::debug!(
        target: TRACING_TARGET,
        status = ?response.status,
        status_code = status_code.as_u16(),
        "health status checked"
    );

    (status_code, Json(response))
}

fn health_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Health status")
        .description(
            "Checks that the database answers a query and reports connection pool usage. \
             Degraded means the pool is close to exhaustion.",
        )
        .response::<200, Json<MonitorStatus>>()
        .response::<503, Json<MonitorStatus>>()
}

/// Returns routes for health monitoring.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/health/", get_with(health_status, health_status_docs))
        .with_path_items(|item| item.tag("Monitors"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::handler::response::ServiceStatus;
    use crate::handler::test::create_test_server_with_router;

    #[tokio::test]
    async fn unreachable_database_is_unhealthy() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes())?;

        let response = server.get("/health/").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        let status: MonitorStatus = response.json();
        assert_eq!(status.status, ServiceStatus::Unhealthy);
        assert!(!status.database.is_reachable);
        Ok(())
    }
}
