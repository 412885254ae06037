use std::time::Duration;

/// Applied and pending migration versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStatus {
    pub applied_versions: Vec<String>,
    pub pending_versions: Vec<String>,
}

impl MigrationStatus {
    #[inline]
    pub fn is_up_to_date(&self) -> bool {
        self.pending_versions.is_empty()
    }

    pub fn last_applied_version(&self) -> Option<&str> {
        self.applied_versions.last().map(String::as_str)
    }
}

/// Outcome of [`run_pending_migrations`].
///
/// [`run_pending_migrations`]: super::run_pending_migrations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    pub duration: Duration,
    pub processed_versions: Vec<String>,
}

impl MigrationResult {
    /// Returns whether nothing had to be applied.
    #[inline]
    pub fn is_no_op(&self) -> bool {
        self.processed_versions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reports_pending() {
        let status = MigrationStatus {
            applied_versions: vec!["20250101000000".into()],
            pending_versions: vec!["20250101000001".into()],
        };
        assert!(!status.is_up_to_date());
        assert_eq!(status.last_applied_version(), Some("20250101000000"));
        assert!(MigrationStatus::default().is_up_to_date());
    }

    #[test]
    fn empty_result_is_no_op() {
        let result = MigrationResult {
            duration: Duration::from_millis(3),
            processed_versions: vec![],
        };
        assert!(result.is_no_op());
    }
}
