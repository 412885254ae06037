//! HTTP error with builder methods for message, resource, context and
//! suggestions.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::{ErrorResponse, ValidationErrorDetail};

/// The error type of HTTP handlers.
///
/// Only the kind, message, resource, suggestion and validation details
/// reach the client. The context is logged.
#[derive(Clone)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error<'a> {
    kind: ErrorKind,
    context: Option<Cow<'a, str>>,
    message: Option<Cow<'a, str>>,
    resource: Option<Cow<'a, str>>,
    suggestion: Option<Cow<'a, str>>,
    validation: Option<Vec<ValidationErrorDetail>>,
}

impl Error<'static> {
    /// Creates a new [`Error`] with the specified kind.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
            message: None,
            resource: None,
            suggestion: None,
            validation: None,
        }
    }
}

impl<'a> Error<'a> {
    /// Attaches internal context; it is logged but not sent to the client.
    #[inline]
    pub fn with_context(self, context: impl Into<Cow<'a, str>>) -> Self {
        Self {
            context: Some(context.into()),
            ..self
        }
    }

    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }

    #[inline]
    pub fn with_resource(self, resource: impl Into<Cow<'a, str>>) -> Self {
        Self {
            resource: Some(resource.into()),
            ..self
        }
    }

    #[inline]
    pub fn with_suggestion(self, suggestion: impl Into<Cow<'a, str>>) -> Self {
        Self {
            suggestion: Some(suggestion.into()),
            ..self
        }
    }

    #[inline]
    pub fn with_validation(self, validation: Vec<ValidationErrorDetail>) -> Self {
        Self {
            validation: Some(validation),
            ..self
        }
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[inline]
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    #[inline]
    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    #[inline]
    pub fn validation(&self) -> Option<&[ValidationErrorDetail]> {
        self.validation.as_deref()
    }

    /// Converts this error into a static version by cloning all borrowed data.
    pub fn into_static(self) -> Error<'static> {
        Error {
            kind: self.kind,
            context: self.context.map(|c| Cow::Owned(c.into_owned())),
            message: self.message.map(|m| Cow::Owned(m.into_owned())),
            resource: self.resource.map(|r| Cow::Owned(r.into_owned())),
            suggestion: self.suggestion.map(|s| Cow::Owned(s.into_owned())),
            validation: self.validation,
        }
    }
}

impl Default for Error<'static> {
    #[inline]
    fn default() -> Self {
        Self::new(ErrorKind::default())
    }
}

impl fmt::Debug for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.kind.response();

        let mut debug_struct = f.debug_struct("Error");
        debug_struct
            .field("kind", &self.kind)
            .field("name", &response.name)
            .field("status", &response.status);

        if let Some(ref message) = self.message {
            debug_struct.field("message", message);
        }

        if let Some(ref resource) = self.resource {
            debug_struct.field("resource", resource);
        }

        if let Some(ref context) = self.context {
            debug_struct.field("context", context);
        }

        if let Some(ref validation) = self.validation {
            debug_struct.field("validation", validation);
        }

        debug_struct.finish()
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.kind.response();
        let message = self.message.as_deref().unwrap_or(&response.message);

        write!(f, "{} ({}): {}", response.name, response.status, message)?;

        if let Some(ref context) = self.context {
            write!(f, " - {}", context)?;
        }

        if let Some(ref resource) = self.resource {
            write!(f, " [resource: {}]", resource)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error<'_> {}

impl IntoResponse for Error<'_> {
    fn into_response(self) -> Response {
        let mut response = self.kind.response();

        if let Some(message) = self.message {
            response = response.with_message(message);
        }

        if let Some(resource) = self.resource {
            response = response.with_resource(resource);
        }

        if let Some(context) = self.context {
            response = response.with_context(context);
        }

        if let Some(suggestion) = self.suggestion {
            response = response.with_suggestion(suggestion);
        }

        if let Some(validation) = self.validation {
            response = response.with_validation_errors(validation);
        }

        response.into_response()
    }
}

// Error bodies are documented per operation with `ErrorResponse`.
impl aide::OperationOutput for Error<'_> {
    type Inner = ();
}

impl From<ErrorKind> for Error<'static> {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// A specialized [`Result`] type for HTTP handlers.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;

/// Every error a handler can respond with, grouped by status family.
#[must_use = "error kinds do nothing unless used to create errors"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // 4xx Client Errors
    /// 400 Bad Request: a required path parameter is missing or malformed.
    MissingPathParam,
    /// 400 Bad Request: the request data is invalid.
    BadRequest,
    /// 401 Unauthorized: no bearer token was sent.
    MissingAuthToken,
    /// 401 Unauthorized: the bearer token could not be decoded.
    MalformedAuthToken,
    /// 401 Unauthorized: invalid credentials or an expired token.
    Unauthorized,
    /// 403 Forbidden: the caller may not access the resource.
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 409 Conflict: the resource is in a conflicting state.
    Conflict,
    /// 413 Payload Too Large: an upload exceeded the configured limit.
    PayloadTooLarge,

    // 5xx Server Errors
    /// 500 Internal Server Error
    #[default]
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
}

impl ErrorKind {
    #[inline]
    pub fn into_error(self) -> Error<'static> {
        Error::new(self)
    }

    #[inline]
    pub fn with_context<'a>(self, context: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_context(context)
    }

    #[inline]
    pub fn with_message<'a>(self, message: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_message(message)
    }

    #[inline]
    pub fn with_resource<'a>(self, resource: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_resource(resource)
    }

    #[inline]
    pub fn status_code(self) -> StatusCode {
        self.response().status
    }

    /// Returns the response template of this error kind.
    #[inline]
    pub fn response(self) -> ErrorResponse<'static> {
        match self {
            Self::MissingPathParam => ErrorResponse::MISSING_PATH_PARAM,
            Self::BadRequest => ErrorResponse::BAD_REQUEST,
            Self::MissingAuthToken => ErrorResponse::MISSING_AUTH_TOKEN,
            Self::MalformedAuthToken => ErrorResponse::MALFORMED_AUTH_TOKEN,
            Self::Unauthorized => ErrorResponse::UNAUTHORIZED,
            Self::Forbidden => ErrorResponse::FORBIDDEN,
            Self::NotFound => ErrorResponse::NOT_FOUND,
            Self::Conflict => ErrorResponse::CONFLICT,
            Self::PayloadTooLarge => ErrorResponse::PAYLOAD_TOO_LARGE,
            Self::InternalServerError => ErrorResponse::INTERNAL_SERVER_ERROR,
            Self::NotImplemented => ErrorResponse::NOT_IMPLEMENTED,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.response().name.as_ref())
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        self.response().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_http_error() {
        let error = Error::default();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_with_context() {
        let error = ErrorKind::BadRequest.with_context("Invalid format");
        assert_eq!(error.context(), Some("Invalid format"));
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_builder_chaining() {
        let error = ErrorKind::NotFound
            .with_message("Property not found")
            .with_resource("property")
            .with_context("ID: 123")
            .with_suggestion("Check the property id");

        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.message(), Some("Property not found"));
        assert_eq!(error.resource(), Some("property"));
        assert_eq!(error.context(), Some("ID: 123"));
        assert_eq!(error.suggestion(), Some("Check the property id"));
    }

    #[test]
    fn std_fmt_display() {
        let error = ErrorKind::NotFound
            .with_message("Resource not found")
            .with_resource("invoice")
            .with_context("ID: 123");

        let display = format!("{}", error);
        assert!(display.contains("not_found"));
        assert!(display.contains("404"));
        assert!(display.contains("Resource not found"));
        assert!(display.contains("ID: 123"));
        assert!(display.contains("invoice"));
    }

    #[test]
    fn display_falls_back_to_default_message() {
        let display = ErrorKind::Forbidden.into_error().to_string();
        assert!(display.contains("Access denied."));
    }

    #[test]
    fn std_fmt_debug() {
        let error = ErrorKind::Forbidden
            .with_message("Access denied")
            .with_resource("tenancy")
            .with_context("Caller is not the landlord");

        let debug = format!("{:?}", error);
        assert!(debug.contains("Forbidden"));
        assert!(debug.contains("Access denied"));
        assert!(debug.contains("tenancy"));
    }

    #[test]
    fn error_into_static() {
        let error = ErrorKind::NotFound
            .with_message("Test message".to_string())
            .with_resource("test_resource".to_string())
            .with_context("Test context".to_string());

        let static_error = error.into_static();
        assert_eq!(static_error.message(), Some("Test message"));
        assert_eq!(static_error.resource(), Some("test_resource"));
        assert_eq!(static_error.context(), Some("Test context"));
    }

    #[test]
    fn all_error_kinds_have_responses() {
        let kinds = [
            ErrorKind::MissingPathParam,
            ErrorKind::BadRequest,
            ErrorKind::MissingAuthToken,
            ErrorKind::MalformedAuthToken,
            ErrorKind::Unauthorized,
            ErrorKind::Forbidden,
            ErrorKind::NotFound,
            ErrorKind::Conflict,
            ErrorKind::PayloadTooLarge,
            ErrorKind::InternalServerError,
            ErrorKind::NotImplemented,
        ];

        for kind in kinds {
            let response = kind.response();
            assert!(!response.name.is_empty());
            assert!(response.status.as_u16() >= 400);
            assert_eq!(kind.into_response().status(), kind.status_code());
        }
    }

    #[test]
    fn payload_too_large_status() {
        assert_eq!(
            ErrorKind::PayloadTooLarge.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }
}
