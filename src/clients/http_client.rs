//! `reqwest`-backed transport.
//!
//! This module provides [`ReqwestTransport`], the default
//! [`AuthenticatedTransport`] used by services. Retrying lives here, in the
//! transport, and never in the core request pipeline.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::clients::errors::{HttpError, HttpResponseError, MaxHttpRetriesExceededError};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::clients::transport::{AuthenticatedTransport, Credentials};

/// Fixed retry wait time in seconds.
pub const RETRY_WAIT_TIME: u64 = 1;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Transport that executes requests with `reqwest`.
///
/// The transport handles:
/// - Credential injection (bearer token or API key)
/// - Default headers including User-Agent
/// - Automatic retry for 429, 500 and 503 responses when `tries > 1`
/// - Mapping non-2xx responses to [`HttpError`]
///
/// # Thread Safety
///
/// `ReqwestTransport` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use cloud_core::clients::{Credentials, ReqwestTransport};
/// use cloud_core::AccessToken;
///
/// let transport = ReqwestTransport::builder()
///     .credentials(Credentials::AccessToken(AccessToken::new("ya29...")?))
///     .tries(3)
///     .build()?;
/// ```
#[derive(Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    credentials: Credentials,
    default_headers: HashMap<String, String>,
    tries: u32,
}

// Verify ReqwestTransport is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ReqwestTransport>();
};

impl ReqwestTransport {
    /// Creates a new builder for constructing a `ReqwestTransport`.
    #[must_use]
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Returns the default headers for this transport.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns the number of attempts made per request.
    #[must_use]
    pub const fn tries(&self) -> u32 {
        self.tries
    }

    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    fn calculate_retry_delay(response: &HttpResponse) -> Duration {
        // Retry-After is only honoured for 429, and only when it is a valid duration
        response
            .retry_request_after
            .filter(|_| response.code == 429)
            .and_then(|retry_after| Duration::try_from_secs_f64(retry_after).ok())
            .unwrap_or(Duration::from_secs(RETRY_WAIT_TIME))
    }

    fn serialize_error(response: &HttpResponse) -> String {
        let mut error_body = serde_json::Map::new();

        if let Some(error) = response.body.get("error") {
            error_body.insert("error".to_string(), error.clone());
        }
        if let Some(errors) = response.body.get("errors") {
            error_body.insert("errors".to_string(), errors.clone());
        }
        if let Some(raw) = response.body.get("raw_body") {
            error_body.insert("raw_body".to_string(), raw.clone());
        }

        if let Some(request_id) = response.request_id() {
            error_body.insert(
                "error_reference".to_string(),
                serde_json::json!(format!(
                    "If you report this error, please include this id: {request_id}."
                )),
            );
        }

        serde_json::to_string(&error_body).unwrap_or_else(|_| "{}".to_string())
    }

    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = match request.http_method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
            HttpMethod::Patch => self.client.patch(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };

        for (key, value) in &self.default_headers {
            builder = builder.header(key, value);
        }
        if let Some(body_type) = &request.body_type {
            builder = builder.header("Content-Type", body_type.as_content_type());
        }
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let res = builder.send().await?;

        let code = res.status().as_u16();
        let headers = Self::parse_response_headers(res.headers());
        let body_text = res.text().await.unwrap_or_default();

        let body = if body_text.is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(&body_text)
                .unwrap_or_else(|_| serde_json::json!({ "raw_body": body_text }))
        };

        Ok(HttpResponse::new(code, headers, body))
    }
}

#[async_trait]
impl AuthenticatedTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let request = self.authenticate(request).await?;

        let mut tries: u32 = 0;
        loop {
            tries += 1;
            tracing::debug!(method = %request.http_method, url = %request.url, attempt = tries, "sending request");

            let response = self.execute(&request).await?;
            if response.is_ok() {
                return Ok(response);
            }

            let code = response.code;
            let message = Self::serialize_error(&response);
            let error_reference = response.request_id().map(String::from);

            let should_retry = matches!(code, 429 | 500 | 503);
            if !should_retry || self.tries <= 1 {
                return Err(HttpError::Response(HttpResponseError {
                    code,
                    message,
                    error_reference,
                    response: Some(response),
                }));
            }

            if tries >= self.tries {
                return Err(HttpError::MaxRetries(MaxHttpRetriesExceededError {
                    code,
                    tries: self.tries,
                    message,
                    error_reference,
                    response: Some(response),
                }));
            }

            let delay = Self::calculate_retry_delay(&response);
            tracing::warn!(
                "Request to {} failed with status {}, retrying in {:?} ({}/{})",
                request.url,
                code,
                delay,
                tries,
                self.tries
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn authenticate(&self, request: HttpRequest) -> Result<HttpRequest, HttpError> {
        request.verify()?;
        Ok(self.credentials.apply(request))
    }
}

/// Builder for constructing [`ReqwestTransport`] instances.
///
/// # Defaults
///
/// - `credentials`: [`Credentials::Anonymous`]
/// - `tries`: 1 (no retries)
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct ReqwestTransportBuilder {
    credentials: Option<Credentials>,
    user_agent_prefix: Option<String>,
    tries: Option<u32>,
}

impl ReqwestTransportBuilder {
    /// Sets the credentials attached to every request.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets the number of times to attempt each request.
    ///
    /// Values below 1 are treated as 1.
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.tries = Some(tries);
        self
    }

    /// Builds the transport.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying reqwest client cannot
    /// be created (e.g. TLS initialization failure).
    pub fn build(self) -> Result<ReqwestTransport, HttpError> {
        let user_agent_prefix = self
            .user_agent_prefix
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let user_agent = format!("{user_agent_prefix}cloud-service-core/{SDK_VERSION}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(ReqwestTransport {
            client,
            credentials: self.credentials.unwrap_or_default(),
            default_headers,
            tries: self.tries.unwrap_or(1).max(1),
        })
    }
}
