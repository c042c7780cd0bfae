//! # Cloud Service Core
//!
//! Shared plumbing for cloud API client libraries: request assembly through
//! a service hierarchy, layered request interceptors, generic CRUD on remote
//! resources and lazy pagination of list methods.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`Service`]: one API family's authenticated endpoint, built from a
//!   [`ServiceConfig`] and an [`AuthenticatedTransport`](clients::AuthenticatedTransport)
//! - [`ServiceObject`]: a remote resource with `create`, `delete`, `exists`,
//!   `get`, `get_metadata` and `set_metadata`, any of which can be suppressed
//! - [`Interceptor`]s registered globally, per service, per object or per call,
//!   folded in that order before every request
//! - [`paginator`]: argument parsing, call-shape routing and a lazy
//!   [`PageStream`](paginator::PageStream) with at most one page fetch in flight
//! - [`ReqwestTransport`](clients::ReqwestTransport): a `reqwest` transport with
//!   bearer-token or API-key credentials and retry handling
//!
//! ## Quick Start
//!
//! ```rust
//! use cloud_core::{BaseUrl, ProjectId, ServiceConfig};
//!
//! let config = ServiceConfig::builder()
//!     .base_url(BaseUrl::new("https://bigquery.googleapis.com/bigquery/v2").unwrap())
//!     .project_id(ProjectId::new("my-project").unwrap())
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Making Requests
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cloud_core::{AccessToken, RequestOptions, Requester, Service};
//! use cloud_core::clients::{Credentials, ReqwestTransport};
//!
//! let transport = ReqwestTransport::builder()
//!     .credentials(Credentials::AccessToken(AccessToken::new("ya29.token")?))
//!     .tries(3)
//!     .build()?;
//! let service = Arc::new(Service::new(config, Arc::new(transport)));
//!
//! service
//!     .interceptors()
//!     .push(|opts: RequestOptions| opts.header("x-goog-user-project", "billing-project"));
//!
//! let response = service.request(RequestOptions::new("datasets")).await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: the "global" interceptor scope is a handle carried by
//!   configuration and shared explicitly
//! - **Fail-fast validation**: all newtypes validate on construction
//! - **Thread-safe**: all types are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio async runtime
//! - **Transport-agnostic**: the core never retries or interprets responses
//!   beyond the 404 convention

pub mod clients;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod paginator;
pub mod request;
pub mod service;

// Re-export public types at crate root for convenience
pub use config::{AccessToken, ApiKey, BaseUrl, ProjectId, ServiceConfig, ServiceConfigBuilder};
pub use error::{ConfigError, Error};
pub use interceptor::{Interceptor, InterceptorChain, Interceptors};
pub use request::{merge_json, RequestOptions, RequestOverrides};
pub use service::{
    CreateMethod, Created, GetConfig, Requester, Service, ServiceObject, ServiceObjectBuilder,
    SharedMethod,
};

// Re-export HTTP client types
pub use clients::{
    HttpError, HttpMethod, HttpRequest, HttpResponse, HttpResponseError,
    MaxHttpRetriesExceededError,
};

// Re-export pagination entry points
pub use paginator::{extend, parse_arguments, router, run_as_stream, Page, PageFetcher, PageStream};
