//! HTTP client core
//!
//! The layering, leaf to root: [`descriptor`] describes a request,
//! [`middleware`] mutates it before send, [`transport`] puts it on the wire
//! and classifies transport failures, and [`client`] runs the dispatch loop
//! that ties them together with status classification and auth recovery.
//! [`transfer`] adds multipart upload and streaming download on top.

pub mod client;
pub mod descriptor;
pub mod middleware;
pub mod transfer;
pub(crate) mod transport;

pub use client::{ApiClient, ApiClientBuilder};
pub use descriptor::{FilePart, ProgressHandler, RequestBody, RequestDescriptor, RequestDescriptorBuilder};
pub use middleware::{BearerAuth, Middleware, RequestLogger, TraceHeaders};
