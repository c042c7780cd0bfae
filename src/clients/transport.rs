//! The authenticated transport seam.
//!
//! The core never performs HTTP itself. Every request leaves through an
//! [`AuthenticatedTransport`], which attaches credentials and executes the
//! call. [`ReqwestTransport`](crate::clients::ReqwestTransport) is the
//! bundled implementation; tests and alternative runtimes provide their own.

use async_trait::async_trait;

use crate::clients::{HttpError, HttpRequest, HttpResponse};
use crate::config::{AccessToken, ApiKey};

/// Credentials attached to outgoing requests.
///
/// Token acquisition and refresh happen outside the core; the transport only
/// applies what it was given.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Credentials {
    /// No credentials; requests are sent as-is.
    #[default]
    Anonymous,
    /// OAuth 2.0 access token sent as `Authorization: Bearer <token>`.
    AccessToken(AccessToken),
    /// API key sent as the `key` query parameter.
    ApiKey(ApiKey),
}

impl Credentials {
    /// Applies these credentials to a request.
    #[must_use]
    pub fn apply(&self, mut request: HttpRequest) -> HttpRequest {
        match self {
            Self::Anonymous => {}
            Self::AccessToken(token) => {
                request.headers.insert(
                    "Authorization".to_string(),
                    format!("Bearer {}", token.as_ref()),
                );
            }
            Self::ApiKey(key) => {
                request
                    .query
                    .insert("key".to_string(), key.as_ref().to_string());
            }
        }
        request
    }
}

/// Executes requests on behalf of a [`Service`](crate::Service).
///
/// Both invocation shapes of an authenticated-request capability are covered:
/// [`send`](Self::send) authenticates and executes, while
/// [`authenticate`](Self::authenticate) only returns the authenticated
/// request so the caller can execute it by other means (for example a
/// resumable upload).
#[async_trait]
pub trait AuthenticatedTransport: Send + Sync {
    /// Authenticates and sends the request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] for validation, network, and non-2xx failures.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;

    /// Returns the request with credentials attached, without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the credentials cannot be applied.
    async fn authenticate(&self, request: HttpRequest) -> Result<HttpRequest, HttpError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpMethod;

    fn request() -> HttpRequest {
        HttpRequest::builder(HttpMethod::Get, "https://example.com/v1/items")
            .build()
            .unwrap()
    }

    #[test]
    fn test_anonymous_credentials_leave_request_untouched() {
        let applied = Credentials::Anonymous.apply(request());
        assert_eq!(applied, request());
    }

    #[test]
    fn test_access_token_sets_bearer_header() {
        let credentials = Credentials::AccessToken(AccessToken::new("ya29.token").unwrap());
        let applied = credentials.apply(request());

        assert_eq!(
            applied.headers.get("Authorization"),
            Some(&"Bearer ya29.token".to_string())
        );
    }

    #[test]
    fn test_api_key_sets_query_param() {
        let credentials = Credentials::ApiKey(ApiKey::new("AIza-key").unwrap());
        let applied = credentials.apply(request());

        assert_eq!(applied.query.get("key"), Some(&"AIza-key".to_string()));
        assert!(applied.headers.get("Authorization").is_none());
    }

    #[test]
    fn test_credentials_debug_masks_secrets() {
        let credentials = Credentials::AccessToken(AccessToken::new("secret-token").unwrap());
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("secret-token"));
    }
}
