//! Server error types.

use std::io;

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Error starting or running the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Server configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to bind to the specified address.
    #[error("Failed to bind to {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("Runtime error: {0}")]
    Runtime(#[source] io::Error),
}

impl ServerError {
    pub fn invalid_config(err: &anyhow::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }

    pub fn bind_error(address: &str, source: io::Error) -> Self {
        Self::BindError {
            address: address.to_owned(),
            source,
        }
    }

    /// Returns a hint for resolving the error, if one applies.
    pub fn suggestion(&self) -> Option<&'static str> {
        let source = match self {
            Self::InvalidConfig(_) => return Some("Check the command-line arguments and environment"),
            Self::BindError { source, .. } | Self::Runtime(source) => source,
        };

        match source.kind() {
            io::ErrorKind::PermissionDenied => {
                Some("Try using a port above 1024 or run with appropriate privileges")
            }
            io::ErrorKind::AddrInUse => {
                Some("The port is already in use. Try a different port or stop the conflicting service")
            }
            io::ErrorKind::AddrNotAvailable => {
                Some("The address is not available. Check network interface configuration")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_errors_suggest_a_fix() {
        let in_use = io::Error::new(io::ErrorKind::AddrInUse, "address in use");
        let error = ServerError::bind_error("127.0.0.1:3000", in_use);

        assert!(error.to_string().starts_with("Failed to bind to 127.0.0.1:3000"));
        assert!(error.suggestion().is_some_and(|hint| hint.contains("already in use")));
    }

    #[test]
    fn unknown_runtime_errors_have_no_suggestion() {
        let error = ServerError::Runtime(io::Error::other("connection reset"));
        assert_eq!(error.suggestion(), None);
    }
}
