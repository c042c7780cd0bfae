//! Configuration types for a [`Service`](crate::Service).
//!
//! # Overview
//!
//! - [`ServiceConfig`]: Base URL, project scoping and global interceptors
//! - [`ServiceConfigBuilder`]: A builder for constructing [`ServiceConfig`] instances
//! - [`BaseUrl`], [`ProjectId`]: Validated newtypes
//! - [`AccessToken`], [`ApiKey`]: Validated credentials with masked debug output
//!
//! # Example
//!
//! ```rust
//! use cloud_core::{BaseUrl, ProjectId, ServiceConfig};
//!
//! let config = ServiceConfig::builder()
//!     .base_url(BaseUrl::new("https://bigquery.googleapis.com/bigquery/v2").unwrap())
//!     .project_id(ProjectId::new("my-project").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert!(config.project_id_required());
//! ```

mod newtypes;

pub use newtypes::{AccessToken, ApiKey, BaseUrl, ProjectId};

use crate::error::ConfigError;
use crate::interceptor::Interceptors;

/// Configuration for one API family.
///
/// # Global Interceptors
///
/// `interceptors` is the global scope of the interceptor chain. The handle is
/// shared: cloning a config, or passing the same [`Interceptors`] to several
/// builders, makes later registrations visible to every service using it.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    base_url: BaseUrl,
    project_id: Option<ProjectId>,
    project_id_required: bool,
    interceptors: Interceptors,
}

impl ServiceConfig {
    /// Creates a new builder for constructing a `ServiceConfig`.
    #[must_use]
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::new()
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

    /// Returns whether request URIs are scoped under `projects/{project_id}`.
    #[must_use]
    pub const fn project_id_required(&self) -> bool {
        self.project_id_required
    }

    /// Returns the global interceptor handle.
    #[must_use]
    pub const fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }
}

// Verify ServiceConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ServiceConfig>();
};

/// Builder for constructing [`ServiceConfig`] instances.
///
/// # Defaults
///
/// - `project_id`: `None`
/// - `project_id_required`: `true`
/// - `interceptors`: a fresh, empty global list
#[derive(Debug, Default)]
pub struct ServiceConfigBuilder {
    base_url: Option<BaseUrl>,
    project_id: Option<ProjectId>,
    project_id_required: Option<bool>,
    interceptors: Option<Interceptors>,
}

impl ServiceConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL (required).
    #[must_use]
    pub fn base_url(mut self, base_url: BaseUrl) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Sets the project ID.
    #[must_use]
    pub fn project_id(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Sets whether request URIs are scoped under `projects/{project_id}`.
    #[must_use]
    pub const fn project_id_required(mut self, required: bool) -> Self {
        self.project_id_required = Some(required);
        self
    }

    /// Sets the global interceptor handle.
    #[must_use]
    pub fn interceptors(mut self, interceptors: Interceptors) -> Self {
        self.interceptors = Some(interceptors);
        self
    }

    /// Builds the [`ServiceConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `base_url` is not set.
    pub fn build(self) -> Result<ServiceConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingRequiredField { field: "base_url" })?;

        Ok(ServiceConfig {
            base_url,
            project_id: self.project_id,
            project_id_required: self.project_id_required.unwrap_or(true),
            interceptors: self.interceptors.unwrap_or_default(),
        })
    }
}
