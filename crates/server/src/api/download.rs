//! Streaming delivery of converted files.
//!
//! The response body owns the request's cleanup guard. Files are deleted
//! right after the last chunk is read, or by the guard's `Drop` if the
//! client goes away first.

use axum::{
    body::{Body, Bytes},
    http::{header, StatusCode},
    response::Response,
};
use formatshift_core::{CleanupGuard, PreparedDelivery};
use futures::Stream;
use std::io;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use super::error::ApiError;

const CHUNK_SIZE: usize = 64 * 1024;
const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Turns a prepared delivery into a streamed attachment.
pub async fn into_response(prepared: PreparedDelivery) -> Result<Response, ApiError> {
    let PreparedDelivery { delivery, guard } = prepared;

    let (file, len) = match open(delivery.path()).await {
        Ok(opened) => opened,
        Err(e) => {
            guard.release().await;
            return Err(ApiError::Internal(format!(
                "Failed to open converted file: {e}"
            )));
        }
    };

    let content_type = if delivery.is_archive() {
        ZIP_CONTENT_TYPE.to_string()
    } else {
        mime_guess::from_path(delivery.file_name())
            .first_or_octet_stream()
            .to_string()
    };
    info!(file = %delivery.file_name(), bytes = len, "Sending converted output");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, len)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(delivery.file_name()),
        )
        .body(Body::from_stream(stream_then_release(file, guard)))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {e}")))
}

async fn open(path: &std::path::Path) -> io::Result<(File, u64)> {
    let file = File::open(path).await?;
    let len = file.metadata().await?.len();
    Ok((file, len))
}

/// `attachment; filename="<name>"`, with characters that cannot appear in
/// a quoted header value replaced.
pub fn content_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

/// Reads `file` in chunks and releases `guard` once it is exhausted.
fn stream_then_release(
    file: File,
    guard: CleanupGuard,
) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
    futures::stream::unfold(Some((file, guard)), |state| async move {
        let (mut file, guard) = state?;
        let mut buf = vec![0u8; CHUNK_SIZE];
        match file.read(&mut buf).await {
            Ok(0) => {
                drop(file);
                guard.release().await;
                None
            }
            Ok(n) => {
                buf.truncate(n);
                Some((Ok(Bytes::from(buf)), Some((file, guard))))
            }
            Err(e) => {
                warn!(error = %e, "Failed to read converted file");
                drop(file);
                guard.release().await;
                Some((Err(e), None))
            }
        }
    })
}
