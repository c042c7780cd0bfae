//! Generic CRUD façade over one remote resource.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::clients::{HttpMethod, HttpResponse};
use crate::error::Error;
use crate::interceptor::Interceptors;
use crate::request::{join_segments, RequestOptions, RequestOverrides};
use crate::service::methods::{CreateMethod, GetConfig, SharedMethod};
use crate::service::Requester;

/// A remote resource with shared create/get/exists/metadata/delete behavior.
///
/// The object caches the last metadata it fetched, created or updated. That
/// cache is only touched by this instance's own operations; callers should
/// serialize metadata-mutating calls on one instance.
///
/// # Method Suppression
///
/// When the builder is given an explicit set of methods, every
/// [`SharedMethod`] not in the set is disabled: [`supports`](Self::supports)
/// returns `false` and the method fails with [`Error::MethodNotAvailable`].
/// [`request`](Requester::request) is always available.
///
/// # Example
///
/// ```rust,ignore
/// use cloud_core::{HttpMethod, RequestOverrides, ServiceObject, SharedMethod};
///
/// let table = ServiceObject::builder(dataset.clone(), "tables", "events")
///     .method(SharedMethod::Get)
///     .method(SharedMethod::GetMetadata)
///     .method_with(SharedMethod::SetMetadata, RequestOverrides::new().method(HttpMethod::Put))
///     .build();
///
/// assert!(!table.supports(SharedMethod::Delete));
/// ```
pub struct ServiceObject {
    parent: Arc<dyn Requester>,
    base_url: String,
    id: String,
    methods: Option<HashMap<SharedMethod, Option<RequestOverrides>>>,
    create_method: Option<Arc<dyn CreateMethod>>,
    metadata: Mutex<Value>,
    interceptors: Interceptors,
}

// Verify ServiceObject is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ServiceObject>();
};

impl ServiceObject {
    /// Creates a builder for an object addressed as `{base_url}/{id}` under
    /// `parent`.
    #[must_use]
    pub fn builder(
        parent: Arc<dyn Requester>,
        base_url: impl Into<String>,
        id: impl Into<String>,
    ) -> ServiceObjectBuilder {
        ServiceObjectBuilder {
            parent,
            base_url: base_url.into(),
            id: id.into(),
            methods: None,
            create_method: None,
            metadata: Value::Object(serde_json::Map::new()),
        }
    }

    /// Returns the resource ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the base URL relative to the parent.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the object-level interceptors.
    #[must_use]
    pub const fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    /// Returns a copy of the cached metadata.
    #[must_use]
    pub fn metadata(&self) -> Value {
        self.metadata.lock().clone()
    }

    /// Returns `true` if the shared method is enabled on this object.
    #[must_use]
    pub fn supports(&self, method: SharedMethod) -> bool {
        self.methods
            .as_ref()
            .map_or(true, |methods| methods.contains_key(&method))
    }

    fn ensure(&self, method: SharedMethod) -> Result<(), Error> {
        if self.supports(method) {
            Ok(())
        } else {
            Err(Error::MethodNotAvailable {
                method: method.as_str(),
            })
        }
    }

    fn defaults_for(&self, method: SharedMethod, base: RequestOptions) -> RequestOptions {
        match self
            .methods
            .as_ref()
            .and_then(|methods| methods.get(&method))
            .and_then(Option::as_ref)
        {
            Some(overrides) => base.with_overrides(overrides),
            None => base,
        }
    }

    /// Sends a request relative to this object.
    ///
    /// The URI becomes `[base_url, id, opts.uri]` with blank segments dropped
    /// and surrounding slashes trimmed. This object's interceptors are placed
    /// ahead of any call-scoped ones, and the request is handed to the
    /// parent.
    ///
    /// This is the fixed implementation the shared methods rely on; wrappers
    /// that customize [`Requester::request`] do not affect it.
    ///
    /// # Errors
    ///
    /// Returns the parent's error verbatim.
    pub async fn base_request(&self, mut opts: RequestOptions) -> Result<HttpResponse, Error> {
        opts.uri = join_segments(
            [self.base_url.as_str(), self.id.as_str(), opts.uri.as_str()]
                .into_iter()
                .filter(|segment| !segment.trim().is_empty()),
        );

        let mut scoped = self.interceptors.snapshot();
        scoped.append(&mut opts.interceptors);
        opts.interceptors = scoped;

        self.parent.request(opts).await
    }

    /// Creates the resource through the configured create method.
    ///
    /// On success the original object is returned, not the new instance
    /// minted by the create method; its metadata is replaced with the new
    /// instance's metadata.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MethodNotAvailable`] if `create` is disabled,
    /// [`Error::CreateNotConfigured`] without a create method, or the create
    /// method's error.
    pub async fn create(
        self: &Arc<Self>,
        options: Value,
    ) -> Result<(Arc<Self>, Option<HttpResponse>), Error> {
        self.ensure(SharedMethod::Create)?;
        self.create_inner(options).await
    }

    async fn create_inner(
        self: &Arc<Self>,
        options: Value,
    ) -> Result<(Arc<Self>, Option<HttpResponse>), Error> {
        let create_method = self
            .create_method
            .as_ref()
            .ok_or_else(|| Error::CreateNotConfigured {
                id: self.id.clone(),
            })?;

        let created = create_method.create(&self.id, options).await?;
        let metadata = created.instance.metadata();
        *self.metadata.lock() = metadata;

        Ok((Arc::clone(self), created.response))
    }

    /// Deletes the resource with `DELETE` on the object's own URI.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MethodNotAvailable`] if `delete` is disabled, or the
    /// transport's error.
    pub async fn delete(&self) -> Result<HttpResponse, Error> {
        self.ensure(SharedMethod::Delete)?;
        let opts = self.defaults_for(
            SharedMethod::Delete,
            RequestOptions::new("").method(HttpMethod::Delete),
        );
        self.base_request(opts).await
    }

    /// Returns whether the resource exists.
    ///
    /// A 404 yields `Ok(false)`; any other error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MethodNotAvailable`] if `exists` is disabled, or any
    /// non-404 error.
    pub async fn exists(&self) -> Result<bool, Error> {
        self.ensure(SharedMethod::Exists)?;
        match self.fetch_metadata().await {
            Ok(_) => Ok(true),
            Err(error) if error.is_not_found() => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Fetches the resource, returning this object and its metadata.
    ///
    /// With [`GetConfig::auto_create`] set, a create method configured and
    /// `create` enabled, a 404 triggers `create` with the config's create
    /// options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MethodNotAvailable`] if `get` is disabled, or the
    /// fetch (or auto-create) error.
    pub async fn get(self: &Arc<Self>, config: GetConfig) -> Result<(Arc<Self>, Value), Error> {
        self.ensure(SharedMethod::Get)?;
        match self.fetch_metadata().await {
            Ok((metadata, _)) => Ok((Arc::clone(self), metadata)),
            Err(error) if error.is_not_found() && config.auto_create && self.can_auto_create() => {
                tracing::warn!(id = %self.id, "resource not found, creating it");
                let (instance, _) = self.create_inner(config.create_options).await?;
                let metadata = instance.metadata();
                Ok((instance, metadata))
            }
            Err(error) => Err(error),
        }
    }

    /// Fetches and caches the resource metadata.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MethodNotAvailable`] if `getMetadata` is disabled, or
    /// the transport's error.
    pub async fn get_metadata(&self) -> Result<(Value, HttpResponse), Error> {
        self.ensure(SharedMethod::GetMetadata)?;
        self.fetch_metadata().await
    }

    fn can_auto_create(&self) -> bool {
        self.create_method.is_some() && self.supports(SharedMethod::Create)
    }

    async fn fetch_metadata(&self) -> Result<(Value, HttpResponse), Error> {
        let opts = self.defaults_for(SharedMethod::GetMetadata, RequestOptions::new(""));
        let response = self.base_request(opts).await?;
        *self.metadata.lock() = response.body.clone();
        Ok((response.body.clone(), response))
    }

    /// Updates the resource with `PATCH` and caches the returned representation.
    ///
    /// Method overrides are deep-merged over `{method: PATCH, uri: "", json:
    /// metadata}`, so a resource may force `PUT` or add body fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MethodNotAvailable`] if `setMetadata` is disabled, or
    /// the transport's error.
    pub async fn set_metadata(&self, metadata: Value) -> Result<HttpResponse, Error> {
        self.ensure(SharedMethod::SetMetadata)?;
        let opts = self.defaults_for(
            SharedMethod::SetMetadata,
            RequestOptions::new("")
                .method(HttpMethod::Patch)
                .json(metadata),
        );
        let response = self.base_request(opts).await?;
        *self.metadata.lock() = response.body.clone();
        Ok(response)
    }
}

#[async_trait]
impl Requester for ServiceObject {
    async fn request(&self, opts: RequestOptions) -> Result<HttpResponse, Error> {
        self.base_request(opts).await
    }
}

impl fmt::Debug for ServiceObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceObject")
            .field("base_url", &self.base_url)
            .field("id", &self.id)
            .field("methods", &self.methods)
            .field("metadata", &self.metadata.lock())
            .field("interceptors", &self.interceptors)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ServiceObject`].
///
/// Without any call to [`method`](Self::method) or
/// [`method_with`](Self::method_with), every shared method is enabled.
pub struct ServiceObjectBuilder {
    parent: Arc<dyn Requester>,
    base_url: String,
    id: String,
    methods: Option<HashMap<SharedMethod, Option<RequestOverrides>>>,
    create_method: Option<Arc<dyn CreateMethod>>,
    metadata: Value,
}

impl ServiceObjectBuilder {
    /// Enables a shared method with its built-in defaults.
    #[must_use]
    pub fn method(mut self, method: SharedMethod) -> Self {
        self.methods
            .get_or_insert_with(HashMap::new)
            .insert(method, None);
        self
    }

    /// Enables a shared method with request overrides deep-merged over its
    /// built-in defaults.
    #[must_use]
    pub fn method_with(mut self, method: SharedMethod, overrides: RequestOverrides) -> Self {
        self.methods
            .get_or_insert_with(HashMap::new)
            .insert(method, Some(overrides));
        self
    }

    /// Sets the capability used by `create` and auto-create.
    #[must_use]
    pub fn create_method(mut self, create_method: impl CreateMethod + 'static) -> Self {
        self.create_method = Some(Arc::new(create_method));
        self
    }

    /// Seeds the metadata cache.
    #[must_use]
    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Builds the object.
    #[must_use]
    pub fn build(self) -> Arc<ServiceObject> {
        Arc::new(ServiceObject {
            parent: self.parent,
            base_url: self.base_url,
            id: self.id,
            methods: self.methods,
            create_method: self.create_method,
            metadata: Mutex::new(self.metadata),
            interceptors: Interceptors::new(),
        })
    }
}

impl fmt::Debug for ServiceObjectBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceObjectBuilder")
            .field("base_url", &self.base_url)
            .field("id", &self.id)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}
