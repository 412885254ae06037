//! Pooled database connection extractor.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut};
use proptrack_postgres::{PgClient, PgConn};

use crate::handler::{Error, ErrorKind};

const TRACING_TARGET: &str = "proptrack_server::extract::pg_pool";

/// A connection checked out of the pool for the duration of the request.
///
/// Every repository trait of `proptrack_postgres` is callable on it:
///
/// ```rust,ignore
/// use proptrack_postgres::query::PropertyRepository;
///
/// async fn get(PgPool(mut conn): PgPool) {
///     let property = conn.find_property_by_id(property_id).await?;
/// }
/// ```
#[derive(Debug, Deref, DerefMut)]
pub struct PgPool(pub PgConn);

impl<S> FromRequestParts<S> for PgPool
where
    PgClient: FromRef<S>,
    S: Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pg_client = PgClient::from_ref(state);
        let conn = pg_client.get_connection().await.map_err(|e| {
            tracing::error!(target: TRACING_TARGET, error = %e, "failed to acquire database connection");
            ErrorKind::InternalServerError
                .with_message("Database connection unavailable")
                .with_context(e.to_string())
        })?;

        Ok(PgPool(conn))
    }
}

impl aide::OperationInput for PgPool {}
