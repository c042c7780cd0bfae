//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use std::fmt;

/// A validated API base URL.
///
/// Surrounding whitespace is trimmed; the value must not be empty. Slashes
/// are preserved here and trimmed per segment when a request URI is joined.
///
/// # Example
///
/// ```rust
/// use cloud_core::BaseUrl;
///
/// let url = BaseUrl::new(" https://bigquery.googleapis.com/bigquery/v2/ ").unwrap();
/// assert_eq!(url.as_ref(), "https://bigquery.googleapis.com/bigquery/v2/");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Creates a new validated base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyBaseUrl`] if the URL is blank.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let url = url.trim();
        if url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        Ok(Self(url.to_string()))
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated project identifier.
///
/// # Example
///
/// ```rust
/// use cloud_core::ProjectId;
///
/// assert!(ProjectId::new("my-project").is_ok());
/// assert!(ProjectId::new("a/b").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProjectId(String);

impl ProjectId {
    /// Creates a new validated project ID.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidProjectId`] if the ID is blank or
    /// contains a path separator.
    pub fn new(project_id: impl Into<String>) -> Result<Self, ConfigError> {
        let project_id = project_id.into();
        let trimmed = project_id.trim();
        if trimmed.is_empty() || trimmed.contains('/') {
            return Err(ConfigError::InvalidProjectId { project_id });
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for ProjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated OAuth 2.0 access token.
///
/// # Security
///
/// The `Debug` implementation masks the token, displaying only
/// `AccessToken(*****)`.
///
/// # Example
///
/// ```rust
/// use cloud_core::AccessToken;
///
/// let token = AccessToken::new("ya29.secret").unwrap();
/// assert_eq!(format!("{:?}", token), "AccessToken(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Creates a new validated access token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyAccessToken`] if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ConfigError::EmptyAccessToken);
        }
        Ok(Self(token))
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(*****)")
    }
}

/// A validated API key.
///
/// Masked in `Debug` output like [`AccessToken`].
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a new validated API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(*****)")
    }
}
