//! Land Registry import request types.
//!
//! The upload itself is multipart; these are the text parts sent alongside
//! the `file` part.

use crate::handler::{ErrorKind, Result};
use crate::service::import::MAX_BATCH_SIZE;

/// Options of `POST /imports/land-registry/`.
#[must_use]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LandRegistryImportOptions {
    /// Whether matching properties get the new sale written over theirs.
    pub update_existing: bool,
    /// Rows per batch; the configured default when absent.
    pub batch_size: Option<usize>,
}

impl LandRegistryImportOptions {
    /// Applies one multipart text field. Unknown fields are ignored.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "updateExisting" => {
                self.update_existing = parse_flag(value).ok_or_else(|| {
                    ErrorKind::BadRequest
                        .with_message("updateExisting must be true or false")
                        .with_resource("import")
                })?;
            }
            "batchSize" => {
                let batch_size = value
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|size| (1..=MAX_BATCH_SIZE).contains(size))
                    .ok_or_else(|| {
                        ErrorKind::BadRequest
                            .with_message(format!(
                                "batchSize must be a number between 1 and {MAX_BATCH_SIZE}"
                            ))
                            .with_resource("import")
                    })?;
                self.batch_size = Some(batch_size);
            }
            _ => {}
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_parsed() -> anyhow::Result<()> {
        let mut options = LandRegistryImportOptions::default();
        options.set_field("updateExisting", "TRUE")?;
        options.set_field("batchSize", " 250 ")?;
        options.set_field("somethingElse", "ignored")?;

        assert!(options.update_existing);
        assert_eq!(options.batch_size, Some(250));
        Ok(())
    }

    #[test]
    fn out_of_range_batch_is_rejected() {
        let mut options = LandRegistryImportOptions::default();
        assert!(options.set_field("batchSize", "0").is_err());
        assert!(options.set_field("batchSize", "5001").is_err());
        assert!(options.set_field("updateExisting", "maybe").is_err());
        assert_eq!(options, LandRegistryImportOptions::default());
    }
}
