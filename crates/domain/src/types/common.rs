//! Response envelopes and pagination shapes shared by every endpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard response envelope the backend wraps every payload in
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<ResponseMeta>,
}

impl<T> ApiEnvelope<T> {
    /// Extract the payload, substituting a default when the endpoint
    /// returned an empty-but-successful envelope
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

/// Metadata attached to envelopes by the backend
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMeta {
    pub timestamp: DateTime<Utc>,
    pub request_id: Option<String>,
    pub version: Option<String>,
}

/// Pagination request parameters
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl PageQuery {
    /// Create a query for the given page with the default page size
    pub fn page(page: u32) -> Self {
        Self { page, ..Self::default() }
    }

    /// Query pairs for the request builder
    pub fn to_pairs(self) -> Vec<(String, String)> {
        vec![("page".to_string(), self.page.to_string()), ("limit".to_string(), self.limit.to_string())]
    }
}

/// Paginated collection response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub results: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

#[cfg(test)]
mod tests {
    //! Unit tests for envelope and pagination shapes.
    use super::*;

    /// Validates the envelope deserializes with and without data.
    #[test]
    fn test_envelope_round_trip() {
        let envelope: ApiEnvelope<u32> = serde_json::from_str(
            r#"{ "success": true, "data": 7, "message": null, "meta": null }"#,
        )
        .unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.into_data(), Some(7));

        let empty: ApiEnvelope<u32> =
            serde_json::from_str(r#"{ "success": true, "data": null, "message": "ok" }"#).unwrap();
        assert_eq!(empty.into_data(), None);
    }

    /// Validates pagination fields map from the wire shape.
    #[test]
    fn test_paginated_wire_shape() {
        let page: Paginated<String> = serde_json::from_str(
            r#"{
                "results": ["a", "b"],
                "total": 42,
                "page": 2,
                "page_size": 2,
                "total_pages": 21,
                "has_next": true,
                "has_previous": true
            }"#,
        )
        .unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.total, 42);
        assert!(page.has_next);
    }

    /// Validates `PageQuery` serializes to the expected query pairs.
    #[test]
    fn test_page_query_pairs() {
        let pairs = PageQuery::page(3).to_pairs();
        assert_eq!(pairs[0], ("page".to_string(), "3".to_string()));
        assert_eq!(pairs[1], ("limit".to_string(), "20".to_string()));
    }
}
