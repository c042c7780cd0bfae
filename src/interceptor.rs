//! Request interceptors and chain composition.
//!
//! An [`Interceptor`] transforms outgoing [`RequestOptions`] before they reach
//! the transport. Interceptors are registered at three levels plus a
//! call-scoped set, and combined per request in a fixed order:
//!
//! 1. global (from [`ServiceConfig`](crate::ServiceConfig))
//! 2. service
//! 3. service object (outermost object first)
//! 4. call-scoped (attached to the [`RequestOptions`] value)
//!
//! Each interceptor receives the output of the previous one.
//!
//! # Example
//!
//! ```rust
//! use cloud_core::{InterceptorChain, Interceptors, RequestOptions};
//!
//! let global = Interceptors::new();
//! global.push(|opts: RequestOptions| opts.header("x-trace", "global"));
//!
//! let service = Interceptors::new();
//! service.push(|opts: RequestOptions| opts.header("x-trace", "service"));
//!
//! let chain = InterceptorChain::compose(&global, &service, Vec::new());
//! let opts = chain.apply(RequestOptions::new("items"));
//! assert_eq!(opts.headers.get("x-trace"), Some(&"service".to_string()));
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::request::RequestOptions;

/// A hook that transforms outgoing request options.
///
/// The default [`request`](Self::request) passes options through unchanged,
/// so an implementation that only carries other behavior is skipped by the
/// fold. Any `Fn(RequestOptions) -> RequestOptions` closure is an interceptor.
pub trait Interceptor: Send + Sync {
    /// Returns the transformed request options.
    fn request(&self, opts: RequestOptions) -> RequestOptions {
        opts
    }
}

impl<F> Interceptor for F
where
    F: Fn(RequestOptions) -> RequestOptions + Send + Sync,
{
    fn request(&self, opts: RequestOptions) -> RequestOptions {
        self(opts)
    }
}

/// A shared, append-only list of interceptors for one scope.
///
/// Cloning the handle shares the underlying list. Registration may happen at
/// any time; requests snapshot the list when their chain is composed, so an
/// append during an in-flight fold does not affect that request.
#[derive(Clone, Default)]
pub struct Interceptors {
    inner: Arc<RwLock<Vec<Arc<dyn Interceptor>>>>,
}

impl Interceptors {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an interceptor at the end of the list.
    pub fn push(&self, interceptor: impl Interceptor + 'static) {
        self.inner.write().push(Arc::new(interceptor));
    }

    /// Registers an already shared interceptor.
    pub fn push_arc(&self, interceptor: Arc<dyn Interceptor>) {
        self.inner.write().push(interceptor);
    }

    /// Returns a copy of the current list, in registration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<dyn Interceptor>> {
        self.inner.read().clone()
    }

    /// Returns the number of registered interceptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` if no interceptors are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl fmt::Debug for Interceptors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptors")
            .field("len", &self.len())
            .finish()
    }
}

/// The combined, ordered interceptor chain for a single request.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    links: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    /// Composes the chain `global ++ service ++ scoped`.
    ///
    /// `scoped` already holds the object-level interceptors followed by the
    /// call-scoped ones, as accumulated on the way up the object hierarchy.
    #[must_use]
    pub fn compose(
        global: &Interceptors,
        service: &Interceptors,
        scoped: Vec<Arc<dyn Interceptor>>,
    ) -> Self {
        let mut links = global.snapshot();
        links.extend(service.snapshot());
        links.extend(scoped);
        Self { links }
    }

    /// Returns the number of interceptors in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns `true` if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Folds the options through every interceptor in order.
    ///
    /// The call-scoped interceptor list is cleared from the result so it never
    /// reaches the transport.
    #[must_use]
    pub fn apply(&self, opts: RequestOptions) -> RequestOptions {
        let mut opts = self.links.iter().enumerate().fold(opts, |opts, (i, link)| {
            tracing::trace!(index = i, uri = %opts.uri, "applying interceptor");
            link.request(opts)
        });
        opts.interceptors.clear();
        opts
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.links.len())
            .finish()
    }
}
