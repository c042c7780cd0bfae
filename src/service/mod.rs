//! Service and service object façades.
//!
//! A [`Service`] represents one API family's authenticated endpoint. A
//! [`ServiceObject`] represents one remote resource and delegates transport
//! to its parent, which is either the service or another object. Both
//! implement [`Requester`], the seam through which requests travel upward.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cloud_core::{BaseUrl, ProjectId, Service, ServiceConfig, ServiceObject};
//! use cloud_core::clients::ReqwestTransport;
//!
//! let config = ServiceConfig::builder()
//!     .base_url(BaseUrl::new("https://bigquery.googleapis.com/bigquery/v2")?)
//!     .project_id(ProjectId::new("my-project")?)
//!     .build()?;
//! let service = Arc::new(Service::new(config, Arc::new(ReqwestTransport::builder().build()?)));
//!
//! let dataset = ServiceObject::builder(service, "datasets", "my_dataset").build();
//! let (_, metadata) = dataset.get(Default::default()).await?;
//! ```

mod methods;
mod object;

pub use methods::{CreateMethod, Created, GetConfig, SharedMethod};
pub use object::{ServiceObject, ServiceObjectBuilder};

use std::sync::Arc;

use async_trait::async_trait;

use crate::clients::{AuthenticatedTransport, HttpRequest, HttpResponse};
use crate::config::{BaseUrl, ProjectId, ServiceConfig};
use crate::error::Error;
use crate::interceptor::{InterceptorChain, Interceptors};
use crate::request::{join_segments, RequestOptions};

/// Anything that can carry a request toward the transport.
///
/// Service objects hold their parent as an `Arc<dyn Requester>`.
#[async_trait]
pub trait Requester: Send + Sync {
    /// Sends the request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns the transport's error verbatim, or a core error raised while
    /// resolving the request.
    async fn request(&self, opts: RequestOptions) -> Result<HttpResponse, Error>;
}

/// One API family's authenticated base endpoint.
///
/// The service is immutable after construction except for its interceptor
/// list, which may be appended to at any time.
pub struct Service {
    base_url: BaseUrl,
    project_id: Option<ProjectId>,
    project_id_required: bool,
    global_interceptors: Interceptors,
    interceptors: Interceptors,
    transport: Arc<dyn AuthenticatedTransport>,
}

// Verify Service is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Service>();
};

impl Service {
    /// Creates a service from its configuration and transport.
    #[must_use]
    pub fn new(config: ServiceConfig, transport: Arc<dyn AuthenticatedTransport>) -> Self {
        Self {
            base_url: config.base_url().clone(),
            project_id: config.project_id().cloned(),
            project_id_required: config.project_id_required(),
            global_interceptors: config.interceptors().clone(),
            interceptors: Interceptors::new(),
            transport,
        }
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the project ID, if configured.
    #[must_use]
    pub const fn project_id(&self) -> Option<&ProjectId> {
        self.project_id.as_ref()
    }

    /// Returns whether URIs are scoped under `projects/{project_id}`.
    #[must_use]
    pub const fn project_id_required(&self) -> bool {
        self.project_id_required
    }

    /// Returns the service-level interceptors.
    #[must_use]
    pub const fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    /// Resolves a service-relative URI into an absolute one.
    ///
    /// Segments are `[base_url, "projects", project_id, uri]` (project
    /// segments only when required), each trimmed of surrounding slashes and
    /// joined with `/`. Any `/:` is then collapsed to `:` so custom verbs
    /// such as `jobs/:cancel` resolve to `jobs:cancel`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingProjectId`] if a project is required but none
    /// is configured.
    pub fn resolve_uri(&self, uri: &str) -> Result<String, Error> {
        let mut segments = vec![self.base_url.as_ref()];
        if self.project_id_required {
            let project_id = self.project_id.as_ref().ok_or(Error::MissingProjectId)?;
            segments.push("projects");
            segments.push(project_id.as_ref());
        }
        segments.push(uri);

        Ok(join_segments(segments).replace("/:", ":"))
    }

    fn prepare(&self, mut opts: RequestOptions) -> Result<HttpRequest, Error> {
        opts.uri = self.resolve_uri(&opts.uri)?;

        let scoped = std::mem::take(&mut opts.interceptors);
        let chain = InterceptorChain::compose(&self.global_interceptors, &self.interceptors, scoped);
        tracing::debug!(
            method = %opts.method,
            uri = %opts.uri,
            interceptors = chain.len(),
            "dispatching request"
        );

        Ok(chain.apply(opts).into_http_request())
    }

    /// Resolves and intercepts the request, then returns it authenticated
    /// without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingProjectId`] or the transport's error.
    pub async fn authenticate_request(&self, opts: RequestOptions) -> Result<HttpRequest, Error> {
        let request = self.prepare(opts)?;
        Ok(self.transport.authenticate(request).await?)
    }
}

#[async_trait]
impl Requester for Service {
    async fn request(&self, opts: RequestOptions) -> Result<HttpResponse, Error> {
        let request = self.prepare(opts)?;
        Ok(self.transport.send(request).await?)
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .field("project_id_required", &self.project_id_required)
            .field("global_interceptors", &self.global_interceptors)
            .field("interceptors", &self.interceptors)
            .finish_non_exhaustive()
    }
}
