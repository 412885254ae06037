use std::borrow::Cow;
use std::collections::HashMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use schemars::JsonSchema;
use serde::Serialize;
use validator::ValidationErrors;

/// Tracing target for rendered error responses.
const TRACING_TARGET: &str = "proptrack_server::handler::errors";

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ValidationErrorDetail {
    /// Field name that failed validation.
    pub field: String,
    /// Validator code, e.g. `length` or `range`.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Parameters of the failed rule, e.g. `min` and `max`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<HashMap<String, serde_json::Value>>,
}

/// JSON body of every error response.
///
/// `context` and `status` are only used for logging and the status line,
/// they are never serialized.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse<'a> {
    /// Stable error identifier, e.g. `not_found`.
    pub name: Cow<'a, str>,
    /// Message safe for client display.
    pub message: Cow<'a, str>,
    /// Resource the error relates to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Cow<'a, str>>,
    /// Hint for resolving the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Cow<'a, str>>,
    /// Per-field validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<Vec<ValidationErrorDetail>>,

    #[serde(skip)]
    pub context: Option<Cow<'a, str>>,
    #[serde(skip)]
    pub status: StatusCode,
}

impl<'a> ErrorResponse<'a> {
    pub const BAD_REQUEST: Self = Self::new(
        "bad_request",
        "Invalid request data.",
        StatusCode::BAD_REQUEST,
    );
    pub const CONFLICT: Self =
        Self::new("conflict", "Resource state conflict.", StatusCode::CONFLICT);
    pub const FORBIDDEN: Self = Self::new("forbidden", "Access denied.", StatusCode::FORBIDDEN);
    pub const INTERNAL_SERVER_ERROR: Self = Self::new(
        "internal_server_error",
        "Internal server error.",
        StatusCode::INTERNAL_SERVER_ERROR,
    );
    pub const MALFORMED_AUTH_TOKEN: Self = Self::new(
        "malformed_auth_token",
        "Malformed auth token.",
        StatusCode::UNAUTHORIZED,
    );
    pub const MISSING_AUTH_TOKEN: Self = Self::new(
        "missing_auth_token",
        "Missing auth token.",
        StatusCode::UNAUTHORIZED,
    );
    pub const MISSING_PATH_PARAM: Self = Self::new(
        "missing_path_param",
        "Missing path parameter.",
        StatusCode::BAD_REQUEST,
    );
    pub const NOT_FOUND: Self =
        Self::new("not_found", "Resource not found.", StatusCode::NOT_FOUND);
    pub const NOT_IMPLEMENTED: Self = Self::new(
        "not_implemented",
        "Not implemented.",
        StatusCode::NOT_IMPLEMENTED,
    );
    pub const PAYLOAD_TOO_LARGE: Self = Self::new(
        "payload_too_large",
        "Payload too large.",
        StatusCode::PAYLOAD_TOO_LARGE,
    );
    pub const UNAUTHORIZED: Self = Self::new(
        "unauthorized",
        "Invalid credentials.",
        StatusCode::UNAUTHORIZED,
    );
    pub const VALIDATION_ERROR: Self = Self::new(
        "validation_error",
        "Validation failed.",
        StatusCode::BAD_REQUEST,
    );

    #[inline]
    pub const fn new(name: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            resource: None,
            suggestion: None,
            validation: None,
            context: None,
            status,
        }
    }

    /// Sets the resource, joining with an existing one by `/`.
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        let new_resource = resource.into();
        self.resource = Some(match self.resource {
            Some(existing) => Cow::Owned(format!("{}/{}", existing, new_resource)),
            None => new_resource,
        });
        self
    }

    /// Appends a sentence to the message.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        let new_message = message.into();
        let base = self.message.trim_end_matches('.');
        self.message = Cow::Owned(format!("{}. {}", base, new_message));
        self
    }

    /// Adds internal context, joining with existing context by `; `.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        let new_context = context.into();
        self.context = Some(match self.context {
            Some(existing) => Cow::Owned(format!("{}; {}", existing, new_context)),
            None => new_context,
        });
        self
    }

    /// Adds a suggestion, joining with an existing one by `; `.
    pub fn with_suggestion(mut self, suggestion: impl Into<Cow<'a, str>>) -> Self {
        let new_suggestion = suggestion.into();
        self.suggestion = Some(match self.suggestion {
            Some(existing) => Cow::Owned(format!("{}; {}", existing, new_suggestion)),
            None => new_suggestion,
        });
        self
    }

    pub fn with_validation_errors(mut self, errors: Vec<ValidationErrorDetail>) -> Self {
        self.validation = Some(errors);
        self
    }

    /// Collects the field errors of `validation_errors`, sorted by field name.
    pub fn from_validation_errors(validation_errors: ValidationErrors) -> Self {
        Self::VALIDATION_ERROR.with_validation_errors(validation_details(&validation_errors))
    }
}

/// Flattens [`ValidationErrors`] into one detail per failed rule.
pub fn validation_details(validation_errors: &ValidationErrors) -> Vec<ValidationErrorDetail> {
    let mut details = Vec::new();

    for (field, field_errors) in validation_errors.field_errors() {
        for error in field_errors {
            let params: HashMap<String, serde_json::Value> = error
                .params
                .iter()
                .filter(|(key, _)| key.as_ref() != "value")
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect();

            details.push(ValidationErrorDetail {
                field: field.to_string(),
                code: error.code.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Validation failed for field '{}'", field)),
                params: (!params.is_empty()).then_some(params),
            });
        }
    }

    details.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
    details
}

impl Default for ErrorResponse<'_> {
    #[inline]
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl From<ValidationErrors> for ErrorResponse<'_> {
    fn from(errors: ValidationErrors) -> Self {
        Self::from_validation_errors(errors)
    }
}

impl IntoResponse for ErrorResponse<'_> {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                target: TRACING_TARGET,
                status = %self.status,
                name = %self.name,
                resource = ?self.resource,
                context = ?self.context,
                "HTTP error response"
            );
        } else {
            tracing::warn!(
                target: TRACING_TARGET,
                status = %self.status,
                name = %self.name,
                message = %self.message,
                resource = ?self.resource,
                context = ?self.context,
                "HTTP error response"
            );
        }

        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Signup {
        #[validate(length(min = 2, max = 100))]
        display_name: String,
        #[validate(email)]
        email_address: String,
    }

    #[test]
    fn error_response_merging_resource() {
        let response = ErrorResponse::NOT_FOUND
            .with_resource("property")
            .with_resource("tenancy");

        assert_eq!(response.resource.as_deref(), Some("property/tenancy"));
    }

    #[test]
    fn error_response_merging_message() {
        let response = ErrorResponse::BAD_REQUEST
            .with_message("Invalid format")
            .with_message("Missing required field");

        assert_eq!(
            &response.message,
            "Invalid request data. Invalid format. Missing required field"
        );
    }

    #[test]
    fn error_response_merging_context() {
        let response = ErrorResponse::INTERNAL_SERVER_ERROR
            .with_context("Database connection failed")
            .with_context("Pool exhausted");

        assert_eq!(
            response.context.as_deref(),
            Some("Database connection failed; Pool exhausted")
        );
    }

    #[test]
    fn error_response_serialization() -> anyhow::Result<()> {
        let response = ErrorResponse::BAD_REQUEST
            .with_resource("invoice")
            .with_message("Test message")
            .with_context("Test context")
            .with_suggestion("Try fixing the data");

        let json = serde_json::to_string(&response)?;

        assert!(json.contains("name"));
        assert!(json.contains("message"));
        assert!(json.contains("resource"));
        assert!(json.contains("suggestion"));

        assert!(!json.contains("context"));
        assert!(!json.contains("status"));
        assert!(!json.contains("validation"));
        Ok(())
    }

    #[test]
    fn validation_errors_are_flattened() {
        let signup = Signup {
            display_name: "a".into(),
            email_address: "not-an-email".into(),
        };

        let Err(errors) = signup.validate() else {
            panic!("signup should be invalid");
        };

        let response = ErrorResponse::from_validation_errors(errors);
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.name, "validation_error");

        let details = response.validation.unwrap_or_default();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].field, "display_name");
        assert_eq!(details[0].code, "length");
        assert_eq!(details[1].field, "email_address");
        assert_eq!(details[1].code, "email");
    }
}
