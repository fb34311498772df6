//! Wire types for the Murmur REST API
//!
//! Field names and casing match the backend's JSON exactly (snake_case), so
//! every struct round-trips with plain serde derives.

pub mod auth;
pub mod common;
pub mod message;
pub mod notification;
pub mod post;
pub mod user;
