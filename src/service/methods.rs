//! Shared CRUD method descriptors.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::clients::HttpResponse;
use crate::error::Error;
use crate::service::ServiceObject;

/// The CRUD operations every [`ServiceObject`] can expose.
///
/// `request` is not listed: it is always available.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SharedMethod {
    /// Create the remote resource.
    Create,
    /// Delete the remote resource.
    Delete,
    /// Check whether the remote resource exists.
    Exists,
    /// Fetch the resource, optionally creating it.
    Get,
    /// Fetch and cache the resource metadata.
    GetMetadata,
    /// Update the resource metadata.
    SetMetadata,
}

impl SharedMethod {
    /// Every shared method, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Create,
        Self::Delete,
        Self::Exists,
        Self::Get,
        Self::GetMetadata,
        Self::SetMetadata,
    ];

    /// Returns the method name as it appears in API documentation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Exists => "exists",
            Self::Get => "get",
            Self::GetMetadata => "getMetadata",
            Self::SetMetadata => "setMetadata",
        }
    }
}

impl fmt::Display for SharedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of a [`CreateMethod`].
#[derive(Debug)]
pub struct Created {
    /// The newly minted object describing the created resource.
    pub instance: Arc<ServiceObject>,
    /// The raw response, if the create method made a request.
    pub response: Option<HttpResponse>,
}

/// Per-resource-type creation capability.
///
/// Supplied at construction; `ServiceObject::create` delegates to it and then
/// copies the new instance's metadata onto the original object.
#[async_trait]
pub trait CreateMethod: Send + Sync {
    /// Creates the resource named `id`.
    ///
    /// # Errors
    ///
    /// Returns whatever error the creation request produced.
    async fn create(&self, id: &str, options: Value) -> Result<Created, Error>;
}

/// Options for `ServiceObject::get`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetConfig {
    /// Create the resource when it does not exist.
    pub auto_create: bool,
    /// Options forwarded to the create method on auto-create.
    pub create_options: Value,
}

impl GetConfig {
    /// Returns a config that creates the resource if it is missing.
    #[must_use]
    pub const fn auto_create(create_options: Value) -> Self {
        Self {
            auto_create: true,
            create_options,
        }
    }
}
