//! Error types for the cloud service core.
//!
//! This module contains the configuration error type and the crate-level
//! [`Error`] returned by every `Service`, `ServiceObject` and paginator
//! operation.
//!
//! # Error Handling
//!
//! Transport failures are surfaced verbatim through [`Error::Http`]. The core
//! only interprets one convention: an HTTP 404 status, exposed through
//! [`Error::is_not_found`], which `exists` and `get` use to detect a missing
//! resource.
//!
//! # Example
//!
//! ```rust
//! use cloud_core::{BaseUrl, ConfigError};
//!
//! let result = BaseUrl::new("   ");
//! assert!(matches!(result, Err(ConfigError::EmptyBaseUrl)));
//! ```

use thiserror::Error;

use crate::clients::{HttpError, HttpResponse};

/// Errors that can occur while building service configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Base URL cannot be empty.
    #[error("Base URL cannot be empty. Please provide the root endpoint of the API.")]
    EmptyBaseUrl,

    /// Project ID is invalid.
    #[error("Invalid project ID '{project_id}'. Project IDs must be non-empty and cannot contain '/'.")]
    InvalidProjectId {
        /// The invalid project ID that was provided.
        project_id: String,
    },

    /// Access token cannot be empty.
    #[error("Access token cannot be empty.")]
    EmptyAccessToken,

    /// API key cannot be empty.
    #[error("API key cannot be empty.")]
    EmptyApiKey,

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}

/// Error type for all core operations.
///
/// Nothing here is fatal to the process; every failure is reported to the
/// caller of the operation that produced it.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport reported an error.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The shared method was not enabled for this service object.
    #[error("Method '{method}' is not available on this service object")]
    MethodNotAvailable {
        /// The name of the suppressed method.
        method: &'static str,
    },

    /// `create` was called on an object without a create method.
    #[error("No create method is configured for '{id}'")]
    CreateNotConfigured {
        /// The ID of the object being created.
        id: String,
    },

    /// The service requires a project ID but none was configured.
    #[error("A project ID is required by this service but none was configured")]
    MissingProjectId,
}

impl Error {
    /// Returns the HTTP status code carried by this error, if any.
    #[must_use]
    pub const fn code(&self) -> Option<u16> {
        match self {
            Self::Http(HttpError::Response(e)) => Some(e.code),
            Self::Http(HttpError::MaxRetries(e)) => Some(e.code),
            _ => None,
        }
    }

    /// Returns the raw response that produced this error, if one was received.
    #[must_use]
    pub const fn response(&self) -> Option<&HttpResponse> {
        match self {
            Self::Http(HttpError::Response(e)) => e.response.as_ref(),
            Self::Http(HttpError::MaxRetries(e)) => e.response.as_ref(),
            _ => None,
        }
    }

    /// Returns `true` if the remote resource does not exist (HTTP 404).
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.code(), Some(404))
    }
}
