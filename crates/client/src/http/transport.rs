//! HTTP transport
//!
//! Thin wrapper over `reqwest` that turns a [`RequestDescriptor`] into a
//! wire request and classifies every transport-level failure into the
//! [`ApiError`] taxonomy. No auth or replay logic lives here; the dispatch
//! loop owns that.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use murmur_domain::{ApiError, ApiResult};
use reqwest::multipart::{Form, Part};
use reqwest::{Client as ReqwestClient, Response};
use url::Url;

use super::descriptor::{FilePart, ProgressHandler, RequestBody, RequestDescriptor};
use crate::config::{ClientConfig, ConfigError};

/// Streamed multipart chunk size; progress granularity follows from this
const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Transport layer owning the connection pool and the base origin
pub(crate) struct Transport {
    http: ReqwestClient,
    base: String,
}

impl Transport {
    /// Build the transport from a validated configuration
    pub(crate) fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let http = ReqwestClient::builder()
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { http, base: config.base_trimmed().to_string() })
    }

    /// Resolve a descriptor's relative path against the base origin
    pub(crate) fn url_for(&self, request: &RequestDescriptor) -> ApiResult<Url> {
        let path = if request.path.starts_with('/') {
            request.path.clone()
        } else {
            format!("/{}", request.path)
        };

        let mut url = Url::parse(&format!("{}{}", self.base, path)).map_err(|e| {
            ApiError::Unknown { message: format!("invalid request path '{}': {e}", request.path) }
        })?;

        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &request.query {
                pairs.append_pair(name, value);
            }
        }

        Ok(url)
    }

    /// Send the request and return the raw response
    ///
    /// # Errors
    /// Transport failures come back classified: deadline → `Timeout`, no
    /// response → `NetworkUnavailable`, anything else → `Unknown`. Status
    /// codes are NOT interpreted here.
    pub(crate) async fn execute(&self, request: &RequestDescriptor) -> ApiResult<Response> {
        let url = self.url_for(request)?;

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .timeout(request.timeout)
            .header("Accept", "application/json");

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => {
                builder.header("Content-Type", "application/json").json(value)
            }
            RequestBody::Multipart(parts) => {
                builder.multipart(build_form(parts, request.progress.clone())?)
            }
        };

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        builder.send().await.map_err(|err| classify_transport_error(&err, request))
    }
}

/// Classify a reqwest error into the taxonomy
fn classify_transport_error(err: &reqwest::Error, request: &RequestDescriptor) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout { duration: request.timeout };
    }
    if err.is_connect() || err.is_request() {
        return ApiError::NetworkUnavailable { message: err.to_string() };
    }
    ApiError::Unknown { message: err.to_string() }
}

/// Assemble the multipart form, wiring byte-counting streams for progress
///
/// A single part is sent under the `file` field; a batch uses indexed
/// `files[n]` fields. Progress is the percentage of total bytes across all
/// parts handed to the connection.
fn build_form(parts: &[FilePart], progress: Option<ProgressHandler>) -> ApiResult<Form> {
    let total: u64 = parts.iter().map(FilePart::len).sum();
    let sent = Arc::new(AtomicU64::new(0));
    let batch = parts.len() > 1;

    let mut form = Form::new();
    for (index, part) in parts.iter().enumerate() {
        let field = if batch { format!("files[{index}]") } else { "file".to_string() };

        let body = counting_body(part.bytes.clone(), total, Arc::clone(&sent), progress.clone());
        let wire_part = Part::stream_with_length(body, part.len())
            .file_name(part.filename.clone())
            .mime_str(&part.mime)
            .map_err(|e| ApiError::Unknown {
                message: format!("invalid mime type '{}': {e}", part.mime),
            })?;

        form = form.part(field, wire_part);
    }

    Ok(form)
}

/// Chunked body that reports cumulative progress as it streams
fn counting_body(
    bytes: Bytes,
    total: u64,
    sent: Arc<AtomicU64>,
    progress: Option<ProgressHandler>,
) -> reqwest::Body {
    reqwest::Body::wrap_stream(futures::stream::iter(progress_chunks(
        bytes, total, sent, progress,
    )))
}

/// Split a payload into frames, reporting cumulative percentage as each
/// frame is yielded to the connection
fn progress_chunks(
    bytes: Bytes,
    total: u64,
    sent: Arc<AtomicU64>,
    progress: Option<ProgressHandler>,
) -> impl Iterator<Item = Result<Bytes, std::io::Error>> {
    let mut chunks = Vec::with_capacity(bytes.len() / UPLOAD_CHUNK_BYTES + 1);
    let mut offset = 0;
    while offset < bytes.len() {
        let end = (offset + UPLOAD_CHUNK_BYTES).min(bytes.len());
        chunks.push(bytes.slice(offset..end));
        offset = end;
    }

    chunks.into_iter().map(move |chunk| {
        let done = sent.fetch_add(chunk.len() as u64, Ordering::AcqRel) + chunk.len() as u64;
        if let Some(handler) = &progress {
            let percent = if total == 0 { 100 } else { (done * 100 / total) as u8 };
            handler.report(percent);
        }
        Ok(chunk)
    })
}
