//! Failures raised below the service layer.
//!
//! A transport reports one of four outcomes through [`HttpError`]: the API
//! answered with a non-2xx status ([`HttpResponseError`]), a retryable status
//! persisted past the configured tries ([`MaxHttpRetriesExceededError`]), the
//! request was malformed before it left ([`InvalidHttpRequestError`]), or the
//! connection itself failed.
//!
//! ```rust,ignore
//! use cloud_core::clients::{AuthenticatedTransport, HttpError};
//!
//! match transport.send(request).await {
//!     Err(HttpError::Response(e)) if e.code == 404 => println!("gone"),
//!     Err(HttpError::MaxRetries(e)) => println!("gave up after {} tries", e.tries),
//!     Err(other) => println!("{other}"),
//!     Ok(response) => println!("{}", response.body),
//! }
//! ```

use thiserror::Error;

use crate::clients::http_response::HttpResponse;

/// Error returned when an HTTP request receives a non-successful response.
///
/// The message field contains JSON with the `error` member of the response
/// body (the conventional `{"error": {"code", "message", "errors"}}` envelope)
/// and an `error_reference` when a request ID was returned.
///
/// # Example
///
/// ```rust
/// use cloud_core::clients::HttpResponseError;
///
/// let error = HttpResponseError {
///     code: 404,
///     message: r#"{"error":"Not found"}"#.to_string(),
///     error_reference: Some("abc-123".to_string()),
///     response: None,
/// };
///
/// println!("Status {}: {}", error.code, error.message);
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// Serialized error message in JSON format.
    pub message: String,
    /// Reference ID for error reporting (from the request ID header).
    pub error_reference: Option<String>,
    /// The raw response that produced this error, when one was received.
    pub response: Option<HttpResponse>,
}

/// Error returned when maximum retry attempts have been exhausted.
///
/// This error is raised when a request continues to fail with a retryable
/// status after all configured attempts have been made.
#[derive(Debug, Error)]
#[error("Exceeded maximum retry count of {tries}. Last message: {message}")]
pub struct MaxHttpRetriesExceededError {
    /// The HTTP status code of the last response.
    pub code: u16,
    /// The number of tries that were attempted.
    pub tries: u32,
    /// Serialized error message from the last response.
    pub message: String,
    /// Reference ID for error reporting (from the request ID header).
    pub error_reference: Option<String>,
    /// The last raw response received.
    pub response: Option<HttpResponse>,
}

/// Error returned when an HTTP request fails validation.
///
/// This error is raised before a request is sent.
///
/// # Example
///
/// ```rust
/// use cloud_core::clients::InvalidHttpRequestError;
///
/// let error = InvalidHttpRequestError::RelativeUrl {
///     url: "datasets/abc".to_string(),
/// };
///
/// assert!(error.to_string().contains("datasets/abc"));
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A request body was provided without specifying the body type.
    #[error("Cannot set a body without also setting body_type.")]
    MissingBodyType,

    /// The request URL is not an absolute `http`/`https` URL.
    #[error("Cannot send a request to '{url}'. Expected an absolute http(s) URL.")]
    RelativeUrl {
        /// The URL that was rejected.
        url: String,
    },
}

/// Unified error type for all HTTP-related errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// An HTTP response error (non-2xx status code).
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Maximum retry attempts exhausted.
    #[error(transparent)]
    MaxRetries(#[from] MaxHttpRetriesExceededError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
