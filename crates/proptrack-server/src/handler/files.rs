//! Uploaded file handlers.
//!
//! Content lives in the storage backend under `files/{accountId}/{fileId}`;
//! the database keeps the metadata and the SHA-256 digest of the content.

use std::str::FromStr;

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::{Bytes, BytesMut};
use proptrack_opendal::StorageBackend;
use proptrack_postgres::model::{FileUpload, NewFileUpload};
use proptrack_postgres::query::FileUploadRepository;
use proptrack_postgres::types::{FileCategory, OffsetPagination};
use proptrack_postgres::{PgClient, PgConn};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::properties::find_owned_property;
use crate::extract::{AuthProvider, AuthState, Json, Multipart, Path, PgPool, Query};
use crate::handler::request::{FilePathParams, FileQuery, Pagination, is_allowed_content_type};
use crate::handler::response::{ErrorResponse, File, FilesPage};
use crate::handler::{ErrorKind, Result};
use crate::service::{ServiceConfig, ServiceState};

/// Tracing target for file operations.
const TRACING_TARGET: &str = "proptrack_server::handler::files";

/// Longest accepted file name, in characters.
const MAX_FILE_NAME_LENGTH: usize = 255;

/// A `file` part read into memory, not yet stored.
struct PendingFile {
    file_name: String,
    content_type: String,
    content: Bytes,
}

/// Strips directories a client may send and rejects unusable names.
fn sanitize_file_name(raw: &str) -> Result<String> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        return Err(ErrorKind::BadRequest
            .with_message("The file name is empty")
            .with_resource("file"));
    }

    if name.chars().count() > MAX_FILE_NAME_LENGTH || name.chars().any(char::is_control) {
        return Err(ErrorKind::BadRequest
            .with_message(format!(
                "File names must be at most {MAX_FILE_NAME_LENGTH} printable characters"
            ))
            .with_resource("file"));
    }

    Ok(name.to_owned())
}

fn storage_key(account_id: Uuid, file_id: Uuid) -> String {
    format!("files/{account_id}/{file_id}")
}

fn sha256_hex(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

async fn find_file(conn: &mut PgConn, file_id: Uuid) -> Result<FileUpload> {
    conn.find_file_upload_by_id(file_id).await?.ok_or_else(|| {
        ErrorKind::NotFound
            .with_message("File not found")
            .with_context(format!("File ID: {file_id}"))
            .with_resource("file")
    })
}

/// Reads one `file` part, enforcing the upload limit while streaming.
async fn read_file_part(
    mut field: axum::extract::multipart::Field<'_>,
    max_upload_size: usize,
) -> Result<PendingFile> {
    let file_name = sanitize_file_name(field.file_name().unwrap_or_default())?;
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_owned();

    if !is_allowed_content_type(&content_type) {
        return Err(ErrorKind::BadRequest
            .with_message(format!("Files of type '{content_type}' are not accepted"))
            .with_context(format!("File name: {file_name}"))
            .with_resource("file"));
    }

    let mut content = BytesMut::new();
    while let Some(chunk) = field.chunk().await? {
        if content.len() + chunk.len() > max_upload_size {
            return Err(ErrorKind::PayloadTooLarge
                .with_message(format!(
                    "Files must not exceed {} MiB",
                    max_upload_size / (1024 * 1024)
                ))
                .with_context(format!("File name: {file_name}"))
                .with_resource("file"));
        }
        content.extend_from_slice(&chunk);
    }

    if content.is_empty() {
        return Err(ErrorKind::BadRequest
            .with_message("The file is empty")
            .with_context(format!("File name: {file_name}"))
            .with_resource("file"));
    }

    Ok(PendingFile {
        file_name,
        content_type,
        content: content.freeze(),
    })
}

/// Uploads one or more files.
///
/// Form data:
/// - `file`: one or more files
/// - `propertyId`: optional property the files belong to
/// - `category`: optional category, `document` by default
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn upload_files(
    State(pg_client): State<PgClient>,
    State(storage): State<StorageBackend>,
    State(config): State<ServiceConfig>,
    AuthState(auth_state): AuthState,
    Multipart(mut multipart): Multipart,
) -> Result<(StatusCode, Json<Vec<File>>)> {
    let mut pending = Vec::new();
    let mut property_id = None;
    let mut category = FileCategory::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "file" => pending.push(read_file_part(field, config.max_upload_size).await?),
            "propertyId" => {
                let value = field.text().await?;
                let parsed = Uuid::from_str(value.trim()).map_err(|_| {
                    ErrorKind::BadRequest
                        .with_message("'propertyId' must be a UUID")
                        .with_resource("file")
                })?;
                property_id = Some(parsed);
            }
            "category" => {
                let value = field.text().await?;
                category = FileCategory::from_str(value.trim()).map_err(|_| {
                    ErrorKind::BadRequest
                        .with_message(format!("Unknown file category '{}'", value.trim()))
                        .with_resource("file")
                })?;
            }
            other => {
                tracing::debug!(target: TRACING_TARGET, field = %other, "ignoring form field");
            }
        }
    }

    if pending.is_empty() {
        return Err(ErrorKind::BadRequest
            .with_message("No files provided")
            .with_suggestion("Send the files as 'file' parts of a multipart form")
            .with_resource("file"));
    }

    let mut conn = pg_client.get_connection().await?;
    if let Some(property_id) = property_id {
        find_owned_property(&mut conn, &auth_state, property_id).await?;
    }

    let mut uploaded = Vec::with_capacity(pending.len());
    for file in pending {
        let file_id = Uuid::now_v7();
        let key = storage_key(auth_state.account_id, file_id);
        let new_file = NewFileUpload {
            id: file_id,
            account_id: auth_state.account_id,
            property_id,
            category,
            file_name: file.file_name,
            content_type: file.content_type,
            file_size: file.content.len() as i64,
            sha256: sha256_hex(&file.content),
            storage_key: key.clone(),
        };

        storage.write(&key, file.content).await?;

        let created = match conn.create_file_upload(new_file).await {
            Ok(created) => created,
            Err(error) => {
                if let Err(cleanup) = storage.delete(&key).await {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        error = %cleanup,
                        key = %key,
                        "failed to remove orphaned content"
                    );
                }
                return Err(error.into());
            }
        };

        tracing::info!(
            target: TRACING_TARGET,
            file_id = %created.id,
            size = created.file_size,
            content_type = %created.content_type,
            "file uploaded"
        );

        uploaded.push(File::from_model(created));
    }

    Ok((StatusCode::CREATED, Json(uploaded)))
}

fn upload_files_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Upload files")
        .description(
            "Uploads one or more `file` parts, optionally attached to a property with a \
             `propertyId` part and labelled with a `category` part. PDF, image, text and \
             office documents are accepted.",
        )
        .response::<201, Json<Vec<File>>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<413, Json<ErrorResponse>>()
}

/// Lists the caller's files.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn list_files(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Query(query): Query<FileQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<(StatusCode, Json<FilesPage>)> {
    let pagination = OffsetPagination::from(pagination);
    let page = conn
        .list_file_uploads(
            auth_state.account_id,
            query.property_id,
            query.category,
            pagination,
        )
        .await?;

    tracing::debug!(
        target: TRACING_TARGET,
        count = page.items.len(),
        total = page.total,
        "files listed"
    );

    let page = FilesPage::from_offset_page(page, pagination, File::from_model);
    Ok((StatusCode::OK, Json(page)))
}

fn list_files_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List files")
        .description("Lists the caller's files, newest first.")
        .response::<200, Json<FilesPage>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Retrieves file metadata.
#[tracing::instrument(
    skip_all,
    fields(account_id = %auth_state.account_id, file_id = %path_params.file_id)
)]
async fn read_file(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<FilePathParams>,
) -> Result<(StatusCode, Json<File>)> {
    let file = find_file(&mut conn, path_params.file_id).await?;
    auth_state.authorize_owner(Some(file.account_id), "file")?;

    Ok((StatusCode::OK, Json(File::from_model(file))))
}

fn read_file_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get file")
        .response::<200, Json<File>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Downloads file content.
#[tracing::instrument(
    skip_all,
    fields(account_id = %auth_state.account_id, file_id = %path_params.file_id)
)]
async fn download_file(
    PgPool(mut conn): PgPool,
    State(storage): State<StorageBackend>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<FilePathParams>,
) -> Result<Response> {
    let file = find_file(&mut conn, path_params.file_id).await?;
    auth_state.authorize_owner(Some(file.account_id), "file")?;

    let content = storage.read(&file.storage_key).await?;

    let content_type = HeaderValue::from_str(&file.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = format!("attachment; filename=\"{}\"", file.file_name.replace('"', ""));
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    tracing::debug!(target: TRACING_TARGET, size = content.len(), "file downloaded");

    let headers = [
        (header::CONTENT_TYPE, content_type),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((StatusCode::OK, headers, content).into_response())
}

fn download_file_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Download file")
        .description("Returns the stored content with its original content type.")
        .response_with::<200, Bytes, _>(|res| res.description("File content"))
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Deletes a file.
#[tracing::instrument(
    skip_all,
    fields(account_id = %auth_state.account_id, file_id = %path_params.file_id)
)]
async fn delete_file(
    PgPool(mut conn): PgPool,
    State(storage): State<StorageBackend>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<FilePathParams>,
) -> Result<StatusCode> {
    let file = find_file(&mut conn, path_params.file_id).await?;
    auth_state.authorize_owner(Some(file.account_id), "file")?;

    conn.delete_file_upload(file.id).await?;

    // The metadata row is gone either way.
    if let Err(error) = storage.delete(&file.storage_key).await {
        tracing::warn!(
            target: TRACING_TARGET,
            error = %error,
            key = %file.storage_key,
            "failed to delete file content"
        );
    }

    tracing::info!(target: TRACING_TARGET, "file deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn delete_file_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete file")
        .description("Deletes the file metadata and its stored content.")
        .response::<204, ()>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Returns routes for file uploads.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/files/",
            post_with(upload_files, upload_files_docs).get_with(list_files, list_files_docs),
        )
        .api_route(
            "/files/{fileId}/",
            get_with(read_file, read_file_docs).delete_with(delete_file, delete_file_docs),
        )
        .api_route(
            "/files/{fileId}/content/",
            get_with(download_file, download_file_docs),
        )
        .with_path_items(|item| item.tag("Files"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directories_are_stripped_from_names() -> anyhow::Result<()> {
        assert_eq!(sanitize_file_name("C:\\scans\\gas-safety.pdf")?, "gas-safety.pdf");
        assert_eq!(sanitize_file_name("../../etc/floor plan.png")?, "floor plan.png");
        Ok(())
    }

    #[test]
    fn unusable_names_are_rejected() {
        assert!(sanitize_file_name("").is_err());
        assert!(sanitize_file_name("uploads/").is_err());
        assert!(sanitize_file_name("..").is_err());
        assert!(sanitize_file_name("lease\u{0}.pdf").is_err());
        assert!(sanitize_file_name(&"a".repeat(MAX_FILE_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn digest_is_lowercase_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            storage_key(Uuid::nil(), Uuid::nil()),
            "files/00000000-0000-0000-0000-000000000000/00000000-0000-0000-0000-000000000000"
        );
    }
}
