//! HTTP response types.
//!
//! This module provides the [`HttpResponse`] type handed back by the
//! transport. It is the "raw response" that accompanies results throughout
//! the core.

use std::collections::HashMap;

/// An HTTP response from a cloud service API.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, lowercased (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body.
    pub body: serde_json::Value,
    /// Seconds to wait before retrying (from `Retry-After` header).
    pub retry_request_after: Option<f64>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`, parsing the `Retry-After` header.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: serde_json::Value) -> Self {
        let retry_request_after = headers
            .get("retry-after")
            .and_then(|values| values.first())
            .and_then(|value| value.parse::<f64>().ok());

        Self {
            code,
            headers,
            body,
            retry_request_after,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the request ID header value, if present.
    ///
    /// Checks `x-request-id` first, then `x-guploader-uploadid`, which some
    /// upload endpoints return instead.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        ["x-request-id", "x-guploader-uploadid"]
            .iter()
            .find_map(|name| self.headers.get(*name).and_then(|values| values.first()))
            .map(String::as_str)
    }
}
