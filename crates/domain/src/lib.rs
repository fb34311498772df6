//! Murmur API data model and error taxonomy.
//!
//! Pure types: the wire shapes the Murmur backend speaks (users, posts,
//! comments, conversations, messages, notifications, pagination envelopes)
//! and the [`ApiError`] taxonomy every client-layer failure is normalized
//! into. No I/O lives here.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod error;
pub mod types;

pub use error::{ApiError, ApiResult, ErrorBody};
pub use types::auth::{AuthPayload, Credentials, RegisterData, TokenPair};
pub use types::common::{ApiEnvelope, Paginated, PageQuery};
