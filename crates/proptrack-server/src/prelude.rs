//! Prelude module for proptrack-server.
//!
//! ```rust
//! use proptrack_server::prelude::*;
//! ```

pub use crate::extract::*;
pub use crate::handler::{Error as HttpError, ErrorKind as HttpErrorKind, routes};
pub use crate::middleware::*;
pub use crate::service::*;
