//! Transport types for cloud service API communication.
//!
//! This module provides the boundary between the core request pipeline and
//! the network. The core hands an [`HttpRequest`] to an
//! [`AuthenticatedTransport`] and receives an [`HttpResponse`] or an
//! [`HttpError`] back.
//!
//! # Overview
//!
//! - [`AuthenticatedTransport`]: The opaque capability that authenticates and executes requests
//! - [`ReqwestTransport`]: The bundled `reqwest` implementation
//! - [`Credentials`]: Bearer token, API key, or anonymous
//! - [`HttpRequest`]: A fully resolved request (absolute URL, no interceptor state)
//! - [`HttpResponse`]: A parsed response
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, PATCH, DELETE)
//!
//! # Retry Behavior
//!
//! Retrying is a transport concern. `ReqwestTransport` retries 429, 500 and
//! 503 responses when configured with `tries > 1`:
//!
//! - **429 (Rate Limited)**: Waits for `Retry-After` if present, or 1 second
//! - **500/503**: Waits a fixed 1 second
//! - **Other errors**: Returned immediately

mod errors;
mod http_client;
mod http_request;
mod http_response;
mod transport;

pub use errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
pub use http_client::{ReqwestTransport, ReqwestTransportBuilder, RETRY_WAIT_TIME, SDK_VERSION};
pub use http_request::{DataType, HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
pub use transport::{AuthenticatedTransport, Credentials};
