use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequestParts, Path as AxumPath};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use super::enhanced_json::sanitize_error_message;
use crate::handler::{Error, ErrorKind};

/// Path parameter extractor whose rejections name the expected format.
///
/// Every identifier in the API is a UUID, so a malformed id yields
/// `400 Bad Request` with a format hint rather than a plain-text body.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Path<T>(pub T);

impl<T> Path<T> {
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let extractor =
            <AxumPath<T> as FromRequestParts<S>>::from_request_parts(parts, state).await;
        extractor.map(|x| Self(x.0)).map_err(Into::into)
    }
}

impl From<PathRejection> for Error<'static> {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(err) => {
                let error_message = err.body_text();
                ErrorKind::MissingPathParam
                    .with_message("Invalid path parameter format")
                    .with_suggestion(enhance_deserialization_error(&error_message))
                    .with_context(sanitize_error_message(&error_message))
            }
            PathRejection::MissingPathParams(err) => ErrorKind::MissingPathParam
                .with_message("Required path parameter missing")
                .with_context(sanitize_error_message(&err.body_text())),
            _ => ErrorKind::InternalServerError
                .with_message("Path processing failed")
                .with_context("Unexpected path rejection; check the route definition"),
        }
    }
}

/// Returns a hint for the type the parameter failed to parse as.
fn enhance_deserialization_error(error_message: &str) -> &'static str {
    let error_lower = error_message.to_lowercase();

    if error_lower.contains("uuid") || error_lower.contains("invalid character") {
        "Identifiers must be UUIDs, e.g. 018f2b4e-6c1a-7d3e-9a51-3c2f8e7b1d40"
    } else if error_lower.contains("invalid digit") || error_lower.contains("cannot parse") {
        "Numeric parameters must contain only digits"
    } else {
        "Check that the parameter format matches the expected type"
    }
}

impl<T> aide::OperationInput for Path<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        AxumPath::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AxumPath::<T>::inferred_early_responses(ctx, operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_errors_get_uuid_hint() {
        let hint = enhance_deserialization_error("UUID parsing failed: invalid character");
        assert!(hint.contains("UUID"));
        assert!(enhance_deserialization_error("something else").contains("expected type"));
    }
}
