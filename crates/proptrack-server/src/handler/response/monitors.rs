//! Monitor response types.

use jiff::Timestamp;
use proptrack_postgres::PgPoolStatus;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Overall health of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Every dependency is reachable.
    Healthy,
    /// Reachable, but the connection pool is close to exhaustion.
    Degraded,
    /// The database cannot be reached.
    Unhealthy,
}

/// Database connection pool usage.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStatus {
    /// Whether a connection could be checked out and queried.
    pub is_reachable: bool,
    /// Configured pool size.
    pub max_connections: usize,
    /// Open connections.
    pub open_connections: usize,
    /// Idle connections ready for use.
    pub idle_connections: usize,
    /// Requests waiting for a connection.
    pub waiting_requests: usize,
}

impl DatabaseStatus {
    pub fn new(is_reachable: bool, pool: PgPoolStatus) -> Self {
        Self {
            is_reachable,
            max_connections: pool.max_size,
            open_connections: pool.size,
            idle_connections: pool.available,
            waiting_requests: pool.waiting,
        }
    }
}

/// System monitoring status response.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    /// Timestamp when this status was generated.
    pub checked_at: Timestamp,
    /// Overall system health status.
    pub status: ServiceStatus,
    /// Application version.
    pub version: String,
    /// Database reachability and pool usage.
    pub database: DatabaseStatus,
}

impl MonitorStatus {
    pub fn new(is_reachable: bool, pool: PgPoolStatus) -> Self {
        let status = match (is_reachable, pool.is_under_pressure()) {
            (false, _) => ServiceStatus::Unhealthy,
            (true, true) => ServiceStatus::Degraded,
            (true, false) => ServiceStatus::Healthy,
        };

        Self {
            checked_at: Timestamp::now(),
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: DatabaseStatus::new(is_reachable, pool),
        }
    }
}
