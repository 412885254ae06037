//! JSON extractor that runs `validator` rules after deserialization.

use std::borrow::Cow;
use std::collections::HashMap;

use axum::extract::{FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use super::Json;
use crate::handler::response::validation_details;
use crate::handler::{Error, ErrorKind};

/// Tracing target for request validation.
const TRACING_TARGET: &str = "proptrack_server::extract::validation";

/// [`Json`] extractor that also calls [`Validate::validate`].
///
/// Failures respond with `400 Bad Request`, a readable summary in the
/// message and one entry per failed rule in `validation`.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T> ValidateJson<T> {
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        data.validate()?;
        Ok(Self::new(data))
    }
}

fn format_length_error(
    field: &str,
    params: &HashMap<Cow<'static, str>, serde_json::Value>,
) -> String {
    let number = |key: &str| params.get(key).and_then(serde_json::Value::as_u64);

    match (number("min"), number("max"), number("equal")) {
        (_, _, Some(equal)) => format!("Field '{}' must be exactly {} characters long", field, equal),
        (Some(min), Some(max), _) => {
            format!("Field '{}' must be between {} and {} characters long", field, min, max)
        }
        (Some(min), None, _) => format!("Field '{}' must be at least {} characters long", field, min),
        (None, Some(max), _) => format!("Field '{}' must be at most {} characters long", field, max),
        _ => format!("Field '{}' has invalid length", field),
    }
}

fn format_range_error(
    field: &str,
    params: &HashMap<Cow<'static, str>, serde_json::Value>,
) -> String {
    let bound = |key: &str| params.get(key).map(ToString::to_string);

    match (bound("min"), bound("max")) {
        (Some(min), Some(max)) => format!("Field '{}' must be between {} and {}", field, min, max),
        (Some(min), None) => format!("Field '{}' must be at least {}", field, min),
        (None, Some(max)) => format!("Field '{}' must be at most {}", field, max),
        _ => format!("Field '{}' is out of valid range", field),
    }
}

/// Formats one failed rule as a sentence.
fn format_validation_error(field: &str, error: &validator::ValidationError) -> String {
    if let Some(custom_message) = &error.message {
        return format!("Field '{}': {}", field, custom_message);
    }

    let message = match error.code.as_ref() {
        "required" => "is required".to_string(),
        "length" => return format_length_error(field, &error.params),
        "range" => return format_range_error(field, &error.params),
        "email" => "must be a valid email address".to_string(),
        "regex" => "has an invalid format".to_string(),
        code => format!("failed validation: {}", code),
    };

    format!("Field '{}' {}", field, message)
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        let mut error_messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, field_errors)| {
                field_errors
                    .iter()
                    .map(move |error| format_validation_error(field, error))
            })
            .collect();
        error_messages.sort();

        let user_message = match error_messages.as_slice() {
            [] => "Validation failed".to_string(),
            [single_error] => single_error.clone(),
            multiple => multiple.join(". "),
        };

        tracing::warn!(
            target: TRACING_TARGET,
            errors = ?errors.field_errors(),
            "request validation failed"
        );

        ErrorKind::BadRequest
            .with_message(user_message)
            .with_resource("request")
            .with_validation(validation_details(&errors))
    }
}

/// A single rule checked in a handler, after the stored record was loaded.
impl From<ValidationError> for Error<'static> {
    fn from(error: ValidationError) -> Self {
        let message = error
            .message
            .as_deref()
            .map_or_else(|| format!("Validation failed: {}", error.code), str::to_owned);

        ErrorKind::BadRequest
            .with_message(message)
            .with_resource("request")
    }
}

impl<T> aide::OperationInput for ValidateJson<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        Json::<T>::inferred_early_responses(ctx, operation)
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct NewTenancy {
        #[validate(length(min = 2, max = 128))]
        tenant_name: String,
        #[validate(range(min = 1, max = 28))]
        rent_due_day: i32,
    }

    #[test]
    fn validation_errors_become_bad_requests() {
        let tenancy = NewTenancy {
            tenant_name: "J".into(),
            rent_due_day: 31,
        };

        let Err(errors) = tenancy.validate() else {
            panic!("tenancy should be invalid");
        };

        let error = Error::from(errors);
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.resource(), Some("request"));
        assert_eq!(
            error.message(),
            Some(
                "Field 'rent_due_day' must be between 1 and 28. \
                 Field 'tenant_name' must be between 2 and 128 characters long"
            )
        );
        assert_eq!(error.validation().map(<[_]>::len), Some(2));
    }
}
