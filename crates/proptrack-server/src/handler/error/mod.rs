//! [`Error`], [`ErrorKind`] and [`Result`].

mod http_error;
mod import_error;
mod pg_account;
mod pg_error;
mod pg_file;
mod pg_financial;
mod pg_property;
mod pg_tenancy;
mod service_error;
mod storage_error;

pub use http_error::{Error, ErrorKind, Result};
