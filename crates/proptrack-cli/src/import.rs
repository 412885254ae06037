//! `proptrack import`: runs the Land Registry import without the HTTP server.

use std::path::Path;

use anyhow::Context;
use proptrack_server::service::ServiceConfig;
use proptrack_server::service::import::{ImportJob, ImportOptions, ImportSource, ImportSummary};
use proptrack_server::service::ImportTracker;
use serde::Serialize;
use uuid::Uuid;

use crate::TRACING_TARGET_IMPORT;
use crate::config::ImportArgs;

/// Name recorded when the path has no file name.
const DEFAULT_FILE_NAME: &str = "price-paid-data.csv";

/// Printed to stdout once the import completes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportReport {
    import_id: Uuid,
    file_name: String,
    #[serde(flatten)]
    summary: ImportSummary,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_owned())
}

/// Fails unless `path` is a non-empty regular file.
async fn check_file(path: &Path) -> anyhow::Result<u64> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    anyhow::ensure!(metadata.is_file(), "{} is not a file", path.display());
    anyhow::ensure!(metadata.len() > 0, "{} is empty", path.display());
    Ok(metadata.len())
}

/// Imports the file and prints the summary as JSON.
///
/// The file is streamed, so full Price Paid Data files do not have to fit
/// in memory. Ctrl+C cancels the import, which rolls back every write.
pub async fn run(service_config: ServiceConfig, args: ImportArgs) -> anyhow::Result<()> {
    let bytes = check_file(&args.file).await?;

    let pg_client = service_config
        .connect_postgres()
        .await
        .context("failed to connect to the database")?;

    let options = ImportOptions::new(Uuid::now_v7())
        .with_batch_size(args.batch_size.unwrap_or(service_config.import_batch_size))
        .with_update_existing(args.update_existing)
        .with_max_row_errors(service_config.import_max_row_errors);

    let tracker = ImportTracker::new();
    let file_name = file_name(&args.file);
    let (job, import) = ImportJob::create(
        pg_client,
        tracker.clone(),
        options,
        None,
        file_name.clone(),
        ImportSource::File(args.file.clone()),
    )
    .await
    .context("failed to record the import")?;

    let import_id = import.id;
    tracing::info!(
        target: TRACING_TARGET_IMPORT,
        %import_id,
        file = %args.file.display(),
        bytes,
        update_existing = args.update_existing,
        "import started"
    );

    let run = job.run();
    tokio::pin!(run);

    let finished = tokio::select! {
        result = &mut run => Some(result),
        signal = tokio::signal::ctrl_c() => {
            if let Err(error) = signal {
                tracing::error!(target: TRACING_TARGET_IMPORT, %error, "failed to listen for Ctrl+C");
            }
            None
        }
    };

    let result = match finished {
        Some(result) => result,
        None => {
            tracing::warn!(target: TRACING_TARGET_IMPORT, %import_id, "cancelling import");
            if let Err(error) = tracker.cancel(import_id).await {
                tracing::warn!(target: TRACING_TARGET_IMPORT, %error, "import could not be cancelled");
            }
            run.await
        }
    };

    let summary = result.with_context(|| format!("import {import_id} did not complete"))?;

    let report = ImportReport {
        import_id,
        file_name,
        summary,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_comes_from_the_path() {
        assert_eq!(file_name(Path::new("/data/pp-2024.csv")), "pp-2024.csv");
        assert_eq!(file_name(Path::new("/")), DEFAULT_FILE_NAME);
    }

    #[tokio::test]
    async fn only_non_empty_files_are_imported() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(check_file(dir.path()).await.is_err());
        assert!(check_file(&dir.path().join("missing.csv")).await.is_err());

        let empty = dir.path().join("empty.csv");
        std::fs::write(&empty, b"")?;
        assert!(check_file(&empty).await.is_err());

        let data = dir.path().join("pp.csv");
        std::fs::write(&data, b"{T1},250000\n")?;
        assert_eq!(check_file(&data).await?, 12);
        Ok(())
    }

    #[test]
    fn report_flattens_the_counters() -> anyhow::Result<()> {
        let report = ImportReport {
            import_id: Uuid::nil(),
            file_name: "pp.csv".to_owned(),
            summary: ImportSummary {
                total_rows: 3,
                processed_rows: 3,
                inserted_rows: 2,
                failed_rows: 1,
                row_errors: vec!["row 3: price must be positive".to_owned()],
                ..ImportSummary::default()
            },
        };

        let json = serde_json::to_value(&report)?;
        assert_eq!(json["fileName"], "pp.csv");
        assert_eq!(json["insertedRows"], 2);
        assert_eq!(json["rowErrors"][0], "row 3: price must be positive");
        Ok(())
    }
}
