//! `POST /api/v1/convert`: upload intake and batch hand-off.

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::Response,
};
use formatshift_core::{batch::naming, BatchError, CleanupGuard, UploadedFile};
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::download;
use super::error::ApiError;
use crate::state::AppState;

/// Form fields naming the target format.
const TARGET_FIELDS: [&str; 2] = ["targetFormat", "target_format"];

/// A parsed conversion request whose uploads are already on disk.
#[derive(Debug, Default)]
pub struct ConvertForm {
    pub files: Vec<UploadedFile>,
    pub target_format: Option<String>,
    /// File parts seen, stored or not.
    pub file_parts: usize,
    guard: CleanupGuard,
}

pub async fn convert(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let form = receive_form(&state, multipart).await?;

    let ConvertForm {
        files,
        target_format,
        guard,
        ..
    } = form;
    info!(files = files.len(), target = ?target_format, "Received conversion request");

    // The batch owns the uploads from here on. It runs in its own task so
    // a client disconnect cannot interrupt a tool mid-run; an abandoned
    // result is cleaned up when dropped.
    guard.disarm();
    let orchestrator = state.orchestrator().clone();
    let target_format = target_format.unwrap_or_default();
    let task = tokio::spawn(async move { orchestrator.run(files, &target_format).await });

    let prepared = match task.await {
        Ok(Ok(prepared)) => prepared,
        Ok(Err(e)) => {
            return Err(ApiError::from_batch(
                &e,
                state.config().server.expose_tool_stderr,
            ))
        }
        Err(e) => return Err(ApiError::Internal(format!("Conversion task failed: {e}"))),
    };

    download::into_response(prepared).await
}

/// Streams every file part into the workspace. On error, everything
/// stored so far is deleted before returning.
async fn receive_form(state: &AppState, mut multipart: Multipart) -> Result<ConvertForm, ApiError> {
    let mut form = ConvertForm::default();
    match read_fields(state, &mut multipart, &mut form).await {
        Ok(()) => Ok(form),
        Err(e) => {
            form.guard.release().await;
            Err(e)
        }
    }
}

async fn read_fields(
    state: &AppState,
    multipart: &mut Multipart,
    form: &mut ConvertForm,
) -> Result<(), ApiError> {
    let limits = &state.config().limits;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            form.file_parts += 1;
            if form.file_parts > limits.max_files {
                // Keep counting for the error message; the part is skipped.
                continue;
            }
            let path = naming::upload_path(state.workspace_dir(), &file_name);
            form.guard.track_source(path.clone());
            let bytes = store_field(field, &path, limits.max_file_size_bytes, &file_name).await?;
            debug!(file = %file_name, path = %path.display(), bytes, "Stored upload");
            form.files.push(UploadedFile::new(file_name, path));
        } else if TARGET_FIELDS.contains(&name.as_str()) {
            let value = field.text().await.map_err(multipart_error)?;
            form.target_format = Some(value.trim().to_string());
        } else {
            debug!(field = %name, "Ignoring form field");
        }
    }

    if form.file_parts > limits.max_files {
        return Err(ApiError::BadRequest(
            BatchError::TooManyFiles {
                count: form.file_parts,
                max: limits.max_files,
            }
            .to_string(),
        ));
    }
    Ok(())
}

async fn store_field(
    mut field: Field<'_>,
    path: &Path,
    max_bytes: u64,
    file_name: &str,
) -> Result<u64, ApiError> {
    let mut file = File::create(path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to store upload: {e}")))?;

    let mut written: u64 = 0;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        written += chunk.len() as u64;
        if written > max_bytes {
            return Err(ApiError::PayloadTooLarge(format!(
                "{file_name} exceeds the upload limit of {max_bytes} bytes"
            )));
        }
        file.write_all(&chunk)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to store upload: {e}")))?;
    }
    file.flush()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to store upload: {e}")))?;
    Ok(written)
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::BadRequest(format!("Malformed upload: {}", e.body_text()))
    }
}
