//! Limits shared by the middleware.

/// Largest accepted request body: 64 MiB.
///
/// Multipart uploads may carry several files; each file is also checked
/// against the configured upload limit.
pub const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024 * 1024;
