use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequestParts, Query as AxumQuery};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};

/// Tracing target for query string rejections.
const TRACING_TARGET: &str = "proptrack_server::extract::query";

/// Query string extractor with descriptive rejections.
///
/// ```rust,no_run
/// use proptrack_server::extract::Query;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// #[serde(rename_all = "camelCase")]
/// struct Search {
///     postcode: String,
///     min_bedrooms: Option<i32>,
/// }
///
/// async fn search(Query(params): Query<Search>) {
///     println!("{} ({:?})", params.postcode, params.min_bedrooms);
/// }
/// ```
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Query<T>(pub T);

impl<T> Query<T> {
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AxumQuery::<T>::from_request_parts(parts, state).await {
            Ok(AxumQuery(query)) => Ok(Query(query)),
            Err(rejection) => Err(enhance_query_error(rejection)),
        }
    }
}

/// Converts a query rejection into a `400 Bad Request` naming the parameter.
fn enhance_query_error(rejection: QueryRejection) -> Error<'static> {
    tracing::debug!(
        target: TRACING_TARGET,
        error = %rejection,
        "query parameter parsing failed"
    );

    match rejection {
        QueryRejection::FailedToDeserializeQueryString(err) => {
            let error_message = err.body_text();

            if error_message.contains("missing field") {
                let field_name = extract_field_name_from_error(&error_message);
                ErrorKind::BadRequest.with_message(format!(
                    "Missing required query parameter '{}'",
                    field_name.unwrap_or("unknown")
                ))
            } else if error_message.contains("duplicate field") {
                let field_name = extract_field_name_from_error(&error_message);
                ErrorKind::BadRequest.with_message(format!(
                    "Query parameter '{}' was provided more than once",
                    field_name.unwrap_or("unknown")
                ))
            } else {
                ErrorKind::BadRequest
                    .with_message("Invalid query parameters")
                    .with_context(error_message)
                    .with_suggestion("Dates use YYYY-MM-DD and identifiers are UUIDs")
            }
        }
        _ => ErrorKind::BadRequest
            .with_message("Invalid query parameters")
            .with_context("The query string could not be parsed"),
    }
}

/// Extracts a field name from a serde message such as ``missing field `town` ``.
fn extract_field_name_from_error(error_message: &str) -> Option<&str> {
    if let Some(start) = error_message.find('`')
        && let Some(end) = error_message[start + 1..].find('`')
    {
        return Some(&error_message[start + 1..start + 1 + end]);
    }

    if let Some(start) = error_message.find("field ") {
        let field_part = &error_message[start + 6..];
        if let Some(end) = field_part.find(' ') {
            return Some(&field_part[..end]);
        }
    }

    None
}

impl<T> aide::OperationInput for Query<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        AxumQuery::<T>::operation_input(ctx, operation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_field_name() {
        assert_eq!(
            extract_field_name_from_error("missing field `postcode`"),
            Some("postcode")
        );
        assert_eq!(
            extract_field_name_from_error("duplicate field limit at line 1"),
            Some("limit")
        );
        assert_eq!(extract_field_name_from_error("some other error"), None);
    }

    #[test]
    fn query_into_inner() {
        let query = Query::new("SW1A".to_string());
        assert_eq!(query.into_inner(), "SW1A");
    }
}
