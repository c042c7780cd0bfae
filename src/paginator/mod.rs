//! Pagination routing for list-style API methods.
//!
//! A list method is described by a [`PageFetcher`]: given a query it returns
//! one [`Page`] of results plus an optional continuation query. The router
//! turns such a fetcher into one of three call shapes:
//!
//! - **Stream mode** (no callback): a lazy [`PageStream`] that fetches pages
//!   only as the consumer pulls items, with at most one fetch in flight.
//! - **Auto-paginate callback mode**: the stream is drained internally and the
//!   callback receives every item at once, or only the error.
//! - **Manual callback mode**: exactly one page is fetched and handed to the
//!   callback verbatim, continuation included.
//!
//! # Example
//!
//! ```rust,ignore
//! use cloud_core::paginator::{extend, Page};
//! use futures::TryStreamExt;
//! use serde_json::{json, Value};
//!
//! let list_tables = extend(move |query: Value| {
//!     let service = service.clone();
//!     async move {
//!         let response = service.request(list_request(&query)).await?;
//!         Ok(Page::from_response(response, &query, "tables", "nextPageToken", "pageToken"))
//!     }
//! });
//!
//! let first_ten: Vec<Value> = list_tables.stream(json!({"maxResults": 10})).try_collect().await?;
//! ```

mod arguments;
mod router;
mod stream;

pub use arguments::{parse_arguments, Argument, ParsedArguments};
pub use router::{extend, router, run_as_stream, PaginatedMethod, Routed};
pub use stream::PageStream;

use std::future::Future;

use async_trait::async_trait;
use serde_json::Value;

use crate::clients::HttpResponse;
use crate::error::Error;

/// Completion handler for callback-style list calls.
pub type ListCallback<T> = Box<dyn FnOnce(Result<Page<T>, Error>) + Send>;

/// One page of list results.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    /// The items in this page, in server order.
    pub items: Vec<T>,
    /// The query for the following page, if any.
    pub next_query: Option<Value>,
    /// The raw response the page was parsed from.
    pub response: Option<HttpResponse>,
}

impl<T> Page<T> {
    /// Creates a page without a raw response.
    #[must_use]
    pub const fn new(items: Vec<T>, next_query: Option<Value>) -> Self {
        Self {
            items,
            next_query,
            response: None,
        }
    }

    /// Attaches the raw response.
    #[must_use]
    pub fn with_response(mut self, response: HttpResponse) -> Self {
        self.response = Some(response);
        self
    }

    /// Returns `true` if the page carries a usable continuation query.
    ///
    /// `null`, `false`, `0` and `""` count as no continuation.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.next_query.as_ref().is_some_and(is_truthy)
    }
}

impl Page<Value> {
    /// Builds a page from a list response body.
    ///
    /// Items are read from `body[items_key]` (missing means empty). If the
    /// body holds a non-empty string under `token_key`, the next query is
    /// `query` with that token stored under `token_param`.
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use cloud_core::{HttpResponse, Page};
    /// use serde_json::json;
    ///
    /// let response = HttpResponse::new(
    ///     200,
    ///     HashMap::new(),
    ///     json!({"datasets": [{"id": "d1"}], "nextPageToken": "abc"}),
    /// );
    /// let page = Page::from_response(response, &json!({}), "datasets", "nextPageToken", "pageToken");
    ///
    /// assert_eq!(page.next_query, Some(json!({"pageToken": "abc"})));
    /// ```
    #[must_use]
    pub fn from_response(
        response: HttpResponse,
        query: &Value,
        items_key: &str,
        token_key: &str,
        token_param: &str,
    ) -> Self {
        let items = response
            .body
            .get(items_key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let next_query = response
            .body
            .get(token_key)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(|token| {
                let mut next = match query {
                    Value::Object(map) => map.clone(),
                    _ => serde_json::Map::new(),
                };
                next.insert(token_param.to_string(), Value::String(token.to_string()));
                Value::Object(next)
            });

        Self {
            items,
            next_query,
            response: Some(response),
        }
    }
}

/// Fetches one page of a list method.
///
/// Any `Fn(Value) -> impl Future<Output = Result<Page<T>, Error>>` closure is a
/// fetcher.
#[async_trait]
pub trait PageFetcher<T: Send + 'static>: Send + Sync {
    /// Fetches the page described by `query`.
    ///
    /// # Errors
    ///
    /// Returns whatever error the underlying request produced.
    async fn fetch_page(&self, query: Value) -> Result<Page<T>, Error>;
}

#[async_trait]
impl<T, F, Fut> PageFetcher<T> for F
where
    T: Send + 'static,
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Page<T>, Error>> + Send + 'static,
{
    async fn fetch_page(&self, query: Value) -> Result<Page<T>, Error> {
        self(query).await
    }
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
