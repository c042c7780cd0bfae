//! Request options threaded through the service hierarchy.
//!
//! A [`RequestOptions`] value starts at the call site with a URI relative to
//! the object being addressed. Each [`ServiceObject`](crate::ServiceObject)
//! level prefixes the URI and adds its interceptors; the owning
//! [`Service`](crate::Service) finally resolves the absolute URI, folds the
//! interceptor chain and converts the result into an
//! [`HttpRequest`](crate::clients::HttpRequest) for the transport.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::clients::{DataType, HttpMethod, HttpRequest};
use crate::interceptor::Interceptor;

/// Options describing one outgoing request.
///
/// # Example
///
/// ```rust
/// use cloud_core::{HttpMethod, RequestOptions};
/// use serde_json::json;
///
/// let opts = RequestOptions::new("tables")
///     .method(HttpMethod::Post)
///     .json(json!({"tableReference": {"tableId": "t"}}))
///     .header("x-goog-request-reason", "audit");
///
/// assert_eq!(opts.uri, "tables");
/// ```
#[derive(Clone, Default)]
pub struct RequestOptions {
    /// The HTTP method (defaults to GET).
    pub method: HttpMethod,
    /// The URI, relative until the owning service resolves it.
    pub uri: String,
    /// Query string parameters.
    pub query: HashMap<String, String>,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// JSON request body.
    pub json: Option<Value>,
    /// Interceptors scoped to this single request.
    ///
    /// Consumed by the interceptor fold and never forwarded to the transport.
    pub(crate) interceptors: Vec<Arc<dyn Interceptor>>,
}

impl RequestOptions {
    /// Creates GET options for the given URI.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Sets the HTTP method.
    #[must_use]
    pub const fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Adds a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Adds a single header, replacing any previous value.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn json(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }

    /// Adds an interceptor that applies to this request only.
    ///
    /// Call-scoped interceptors run last, after the global, service and
    /// object scopes.
    #[must_use]
    pub fn interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Returns the number of call-scoped interceptors attached.
    #[must_use]
    pub fn scoped_interceptor_count(&self) -> usize {
        self.interceptors.len()
    }

    /// Layers method-specific overrides over these options.
    ///
    /// Scalars in the overrides replace the base value; query and header maps
    /// are merged key by key; JSON bodies are merged deeply.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &RequestOverrides) -> Self {
        if let Some(method) = overrides.method {
            self.method = method;
        }
        if let Some(uri) = &overrides.uri {
            self.uri.clone_from(uri);
        }
        self.query.extend(overrides.query.clone());
        self.headers.extend(overrides.headers.clone());
        if let Some(overlay) = &overrides.json {
            match self.json.as_mut() {
                Some(base) => merge_json(base, overlay.clone()),
                None => self.json = Some(overlay.clone()),
            }
        }
        self
    }

    /// Converts these options into the transport request, dropping any
    /// call-scoped interceptors.
    #[must_use]
    pub fn into_http_request(self) -> HttpRequest {
        let body_type = self.json.as_ref().map(|_| DataType::Json);
        HttpRequest {
            http_method: self.method,
            url: self.uri,
            body: self.json,
            body_type,
            query: self.query,
            headers: self.headers,
        }
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("json", &self.json)
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

/// Partial request options registered per shared method.
///
/// # Example
///
/// ```rust
/// use cloud_core::{HttpMethod, RequestOverrides};
///
/// // Force PUT for setMetadata on a resource that does not support PATCH.
/// let overrides = RequestOverrides::new().method(HttpMethod::Put);
/// assert_eq!(overrides.method, Some(HttpMethod::Put));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestOverrides {
    /// Replacement HTTP method.
    pub method: Option<HttpMethod>,
    /// Replacement URI.
    pub uri: Option<String>,
    /// Extra query parameters.
    pub query: HashMap<String, String>,
    /// Extra headers.
    pub headers: HashMap<String, String>,
    /// JSON deep-merged into the body.
    pub json: Option<Value>,
}

impl RequestOverrides {
    /// Creates empty overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the replacement HTTP method.
    #[must_use]
    pub const fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the replacement URI.
    #[must_use]
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets JSON to deep-merge into the body.
    #[must_use]
    pub fn json(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }
}

/// Deep-merges `overlay` into `base`.
///
/// Objects merge key by key; any other overlay value replaces the base.
pub fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Joins URI segments with `/`, trimming leading and trailing slashes from
/// each segment first.
pub(crate) fn join_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    segments
        .into_iter()
        .map(|segment| segment.trim_matches('/'))
        .collect::<Vec<_>>()
        .join("/")
}
