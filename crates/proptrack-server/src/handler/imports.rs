//! Land Registry import handlers.
//!
//! An upload is recorded, then processed on a background task; clients poll
//! `GET /imports/{importId}/` for progress.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use bytes::BytesMut;
use proptrack_postgres::model::LandRegistryImport;
use proptrack_postgres::query::LandRegistryImportRepository;
use proptrack_postgres::types::OffsetPagination;
use proptrack_postgres::{PgClient, PgConn};
use uuid::Uuid;

use crate::extract::{AuthProvider, AuthState, Json, Multipart, Path, PgPool, Query};
use crate::handler::request::{ImportPathParams, LandRegistryImportOptions, Pagination};
use crate::handler::response::{ErrorResponse, Import, ImportsPage};
use crate::handler::{ErrorKind, Result};
use crate::service::import::{FINISHED_RETENTION, ImportJob, ImportOptions};
use crate::service::{ImportError, ImportTracker, ServiceConfig, ServiceState};

/// Tracing target for import operations.
const TRACING_TARGET: &str = "proptrack_server::handler::imports";

/// Name given to uploads without a file name.
const DEFAULT_FILE_NAME: &str = "price-paid-data.csv";

async fn find_import(conn: &mut PgConn, import_id: Uuid) -> Result<LandRegistryImport> {
    conn.find_import_by_id(import_id).await?.ok_or_else(|| {
        ImportError::NotFound(import_id).into()
    })
}

fn ensure_cancellable(import: &LandRegistryImport) -> Result<()> {
    if !import.is_terminal() {
        return Ok(());
    }

    Err(ImportError::NotCancellable {
        import_id: import.id,
        status: import.status,
    }
    .into())
}

/// Starts a Land Registry Price Paid Data import.
///
/// Form data:
/// - `file`: the CSV file
/// - `updateExisting`: optional, `true` to overwrite sales of matching properties
/// - `batchSize`: optional, rows per batch
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn start_import(
    State(pg_client): State<PgClient>,
    State(tracker): State<ImportTracker>,
    State(config): State<ServiceConfig>,
    AuthState(auth_state): AuthState,
    Multipart(mut multipart): Multipart,
) -> Result<(StatusCode, Json<Import>)> {
    let mut options = LandRegistryImportOptions::default();
    let mut upload = None;

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_owned();
        if name != "file" {
            let value = field.text().await?;
            options.set_field(&name, &value)?;
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_owned();

        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await? {
            if data.len() + chunk.len() > config.max_upload_size {
                return Err(ErrorKind::PayloadTooLarge
                    .with_message(format!(
                        "Import files must not exceed {} MiB",
                        config.max_upload_size / (1024 * 1024)
                    ))
                    .with_resource("import"));
            }
            data.extend_from_slice(&chunk);
        }

        upload = Some((file_name, data.freeze()));
    }

    let Some((file_name, data)) = upload.filter(|(_, data)| !data.is_empty()) else {
        return Err(ErrorKind::BadRequest
            .with_message("No CSV file provided")
            .with_suggestion("Send the Price Paid Data CSV as the 'file' part")
            .with_resource("import"));
    };

    let pruned = tracker.prune(FINISHED_RETENTION).await;
    if pruned > 0 {
        tracing::debug!(target: TRACING_TARGET, pruned, "finished imports pruned");
    }

    let import_options = ImportOptions::new(Uuid::now_v7())
        .with_batch_size(options.batch_size.unwrap_or(config.import_batch_size))
        .with_update_existing(options.update_existing)
        .with_max_row_errors(config.import_max_row_errors);

    let (job, import) = ImportJob::create(
        pg_client,
        tracker,
        import_options,
        Some(auth_state.account_id),
        file_name,
        data,
    )
    .await?;

    job.spawn();

    tracing::info!(
        target: TRACING_TARGET,
        import_id = %import.id,
        update_existing = import.update_existing,
        "import started"
    );

    Ok((StatusCode::ACCEPTED, Json(Import::from_model(import))))
}

fn start_import_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Start Land Registry import")
        .description(
            "Accepts an HM Land Registry Price Paid Data CSV (16 columns, optional header) and \
             processes it in the background. Rows that fail validation are reported and \
             skipped; any other failure rolls the whole import back.",
        )
        .response::<202, Json<Import>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<413, Json<ErrorResponse>>()
}

/// Lists the caller's imports.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn list_imports(
    PgPool(mut conn): PgPool,
    State(tracker): State<ImportTracker>,
    AuthState(auth_state): AuthState,
    Query(pagination): Query<Pagination>,
) -> Result<(StatusCode, Json<ImportsPage>)> {
    let pagination = OffsetPagination::from(pagination);
    let page = conn
        .list_imports_for_account(auth_state.account_id, pagination)
        .await?;

    let running = tracker.list_for_account(auth_state.account_id).await;
    let page = ImportsPage::from_offset_page(page, pagination, |import| {
        let tracked = running
            .iter()
            .find(|tracked| tracked.import_id == import.id)
            .cloned();
        Import::with_tracked(import, tracked)
    });

    tracing::debug!(
        target: TRACING_TARGET,
        count = page.items.len(),
        running = running.len(),
        "imports listed"
    );

    Ok((StatusCode::OK, Json(page)))
}

fn list_imports_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List imports")
        .description("Lists the caller's imports, newest first.")
        .response::<200, Json<ImportsPage>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Retrieves an import with its live progress.
#[tracing::instrument(
    skip_all,
    fields(account_id = %auth_state.account_id, import_id = %path_params.import_id)
)]
async fn read_import(
    PgPool(mut conn): PgPool,
    State(tracker): State<ImportTracker>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ImportPathParams>,
) -> Result<(StatusCode, Json<Import>)> {
    let import = find_import(&mut conn, path_params.import_id).await?;
    auth_state.authorize_owner(import.account_id, "import")?;

    let tracked = tracker.get(import.id).await;
    Ok((StatusCode::OK, Json(Import::with_tracked(import, tracked))))
}

fn read_import_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get import")
        .description("Returns the status and row counters of an import.")
        .response::<200, Json<Import>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Requests cancellation of a running import.
#[tracing::instrument(
    skip_all,
    fields(account_id = %auth_state.account_id, import_id = %path_params.import_id)
)]
async fn cancel_import(
    PgPool(mut conn): PgPool,
    State(tracker): State<ImportTracker>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ImportPathParams>,
) -> Result<(StatusCode, Json<Import>)> {
    let import = find_import(&mut conn, path_params.import_id).await?;
    auth_state.authorize_owner(import.account_id, "import")?;

    ensure_cancellable(&import)?;

    tracker.cancel(import.id).await?;
    tracing::info!(target: TRACING_TARGET, "import cancellation requested");

    let tracked = tracker.get(import.id).await;
    Ok((StatusCode::ACCEPTED, Json(Import::with_tracked(import, tracked))))
}

fn cancel_import_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Cancel import")
        .description(
            "Stops a pending or processing import before its next batch and rolls back \
             everything it wrote.",
        )
        .response::<202, Json<Import>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Returns routes for Land Registry imports.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/imports/land-registry/",
            post_with(start_import, start_import_docs),
        )
        .api_route("/imports/", get_with(list_imports, list_imports_docs))
        .api_route(
            "/imports/{importId}/",
            get_with(read_import, read_import_docs),
        )
        .api_route(
            "/imports/{importId}/cancel/",
            post_with(cancel_import, cancel_import_docs),
        )
        .with_path_items(|item| item.tag("Imports"))
}

#[cfg(test)]
mod tests {
    use axum_test::multipart::{MultipartForm, Part};
    use jiff::Timestamp;
    use proptrack_postgres::types::ImportStatus;

    use super::*;
    use crate::extract::AuthClaims;
    use crate::handler::test::create_test_server_signed_in;

    fn import(account_id: Option<Uuid>, status: ImportStatus) -> LandRegistryImport {
        let now = Timestamp::now();
        LandRegistryImport {
            id: Uuid::new_v4(),
            account_id,
            file_name: "pp-2024.csv".into(),
            status,
            batch_size: 500,
            update_existing: false,
            total_rows: 0,
            processed_rows: 0,
            inserted_rows: 0,
            updated_rows: 0,
            skipped_rows: 0,
            deleted_rows: 0,
            failed_rows: 0,
            row_errors: serde_json::json!([]),
            failure_reason: None,
            started_at: None,
            completed_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn csv_part() -> Part {
        Part::bytes(b"{T1},250000,2023-01-31,RG1 8DU,S,N,F,1,,,,READING,,,A,A\n".to_vec())
            .file_name("pp-2024.csv")
            .mime_type("text/csv")
    }

    #[tokio::test]
    async fn uploads_need_a_file() -> anyhow::Result<()> {
        let claims = AuthClaims::for_account(Uuid::new_v4(), false);
        let server = create_test_server_signed_in(routes(), claims)?;

        let form = MultipartForm::new().add_text("updateExisting", "true");
        let response = server.post("/imports/land-registry/").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["resource"], "import");
        Ok(())
    }

    #[tokio::test]
    async fn batch_size_must_be_positive() -> anyhow::Result<()> {
        let claims = AuthClaims::for_account(Uuid::new_v4(), false);
        let server = create_test_server_signed_in(routes(), claims)?;

        let form = MultipartForm::new()
            .add_text("batchSize", "0")
            .add_part("file", csv_part());
        let response = server.post("/imports/land-registry/").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[test]
    fn finished_imports_cannot_be_cancelled() {
        assert!(ensure_cancellable(&import(None, ImportStatus::Pending)).is_ok());
        assert!(ensure_cancellable(&import(None, ImportStatus::Processing)).is_ok());

        for status in [ImportStatus::Completed, ImportStatus::Failed, ImportStatus::Cancelled] {
            let Err(error) = ensure_cancellable(&import(None, status)) else {
                panic!("{status} imports must not be cancellable");
            };
            assert_eq!(error.kind(), ErrorKind::Conflict);
        }
    }

    #[test]
    fn imports_of_other_accounts_are_forbidden() {
        let owner = Uuid::new_v4();
        let theirs = import(Some(owner), ImportStatus::Processing);

        let stranger = AuthClaims::for_account(Uuid::new_v4(), false);
        let Err(error) = stranger.authorize_owner(theirs.account_id, "import") else {
            panic!("another account's import must be forbidden");
        };
        assert_eq!(error.kind(), ErrorKind::Forbidden);

        let admin = AuthClaims::for_account(Uuid::new_v4(), true);
        assert!(admin.authorize_owner(theirs.account_id, "import").is_ok());

        let command_line = import(None, ImportStatus::Completed);
        assert!(stranger.authorize_owner(command_line.account_id, "import").is_err());
        assert!(admin.authorize_owner(command_line.account_id, "import").is_ok());
    }
}
