//! Upload and download operations
//!
//! Uploads are multipart forms (`file` for a single part, `files[n]` for a
//! batch) with percentage progress derived from bytes streamed. Downloads
//! stream the binary response to a caller-supplied path.

use std::path::Path;

use futures::StreamExt;
use murmur_domain::{ApiError, ApiResult};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::client::ApiClient;
use super::descriptor::{FilePart, ProgressHandler, RequestDescriptor};

fn write_error(err: &std::io::Error) -> ApiError {
    ApiError::Unknown { message: format!("failed to write download: {err}") }
}

impl ApiClient {
    /// Upload a single file as a multipart `file` field
    ///
    /// # Errors
    /// Returns a classified [`ApiError`] on any failure.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        file: FilePart,
        progress: Option<ProgressHandler>,
    ) -> ApiResult<T> {
        let mut builder =
            RequestDescriptor::builder(Method::POST, path).multipart(vec![file]);
        if let Some(handler) = progress {
            builder = builder.progress(handler);
        }
        self.send(builder.build()).await
    }

    /// Upload several files as indexed `files[n]` fields
    ///
    /// Progress covers the batch as a whole: the percentage of total bytes
    /// across every part.
    pub async fn upload_batch<T: DeserializeOwned>(
        &self,
        path: &str,
        files: Vec<FilePart>,
        progress: Option<ProgressHandler>,
    ) -> ApiResult<T> {
        let mut builder = RequestDescriptor::builder(Method::POST, path).multipart(files);
        if let Some(handler) = progress {
            builder = builder.progress(handler);
        }
        self.send(builder.build()).await
    }

    /// Download a binary response to the given filesystem path
    ///
    /// Progress is derived from `Content-Length` when the server reports
    /// one; a terminal 100% is always reported on completion. Returns the
    /// number of bytes written.
    ///
    /// # Errors
    /// Transport and status failures come back classified; local write
    /// failures surface as `Unknown`.
    pub async fn download(
        &self,
        path: &str,
        destination: &Path,
        progress: Option<ProgressHandler>,
    ) -> ApiResult<u64> {
        let response = self.dispatch(RequestDescriptor::get(path)).await?;
        let total = response.content_length();

        let mut file = tokio::fs::File::create(destination).await.map_err(|e| write_error(&e))?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ApiError::Unknown {
                message: format!("download stream failed: {e}"),
            })?;
            file.write_all(&chunk).await.map_err(|e| write_error(&e))?;
            written += chunk.len() as u64;

            if let (Some(handler), Some(total)) = (&progress, total) {
                if total > 0 {
                    handler.report((written * 100 / total) as u8);
                }
            }
        }

        file.flush().await.map_err(|e| write_error(&e))?;
        if let Some(handler) = &progress {
            handler.report(100);
        }

        debug!(path, bytes = written, destination = %destination.display(), "download complete");
        Ok(written)
    }
}
