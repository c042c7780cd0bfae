//! Call-shape dispatch for paginated list methods.

use std::fmt;
use std::sync::Arc;

use futures::TryStreamExt;
use serde_json::Value;

use crate::error::Error;
use crate::paginator::{parse_arguments, Argument, Page, PageFetcher, PageStream, ParsedArguments};

/// The outcome of routing a list call.
pub enum Routed<T: Send + 'static> {
    /// No callback was given; the caller drives this stream.
    Stream(PageStream<T>),
    /// The callback has been invoked.
    Delivered,
}

impl<T: Send + 'static> Routed<T> {
    /// Returns the stream, if the call was routed to stream mode.
    #[must_use]
    pub fn into_stream(self) -> Option<PageStream<T>> {
        match self {
            Self::Stream(stream) => Some(stream),
            Self::Delivered => None,
        }
    }

    /// Returns `true` if the callback was invoked.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl<T: Send + 'static> fmt::Debug for Routed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream(stream) => f.debug_tuple("Stream").field(stream).finish(),
            Self::Delivered => f.write_str("Delivered"),
        }
    }
}

/// Returns the lazy item stream for `args`, ignoring any callback.
///
/// The stream follows continuation queries until they run out or
/// `args.max_results` items have been yielded.
#[must_use]
pub fn run_as_stream<T: Send + 'static>(
    args: ParsedArguments<T>,
    fetcher: Arc<dyn PageFetcher<T>>,
) -> PageStream<T> {
    PageStream::new(fetcher, args.query, args.max_results)
}

/// Dispatches a list call according to its arguments.
///
/// - Without a callback, returns [`Routed::Stream`] and fetches nothing.
/// - With a callback and auto-pagination, drains the stream and invokes the
///   callback once with every item (or only the first error). The delivered
///   page has no continuation and carries the last raw response.
/// - With a callback and no auto-pagination, fetches exactly one page with
///   the original query and hands it to the callback unchanged.
pub async fn router<T: Send + 'static>(
    args: ParsedArguments<T>,
    fetcher: Arc<dyn PageFetcher<T>>,
) -> Routed<T> {
    let ParsedArguments {
        query,
        callback,
        max_results,
        auto_paginate,
    } = args;

    let Some(callback) = callback else {
        return Routed::Stream(PageStream::new(fetcher, query, max_results));
    };

    if auto_paginate {
        let mut stream = PageStream::new(fetcher, query, max_results);
        let collected = (&mut stream).try_collect::<Vec<T>>().await;
        let result = collected.map(|items| Page {
            items,
            next_query: None,
            response: stream.last_response().cloned(),
        });
        tracing::debug!(
            pages = stream.pages_fetched(),
            ok = result.is_ok(),
            "delivering collected pages"
        );
        callback(result);
    } else {
        tracing::debug!("delivering single page");
        callback(fetcher.fetch_page(query).await);
    }

    Routed::Delivered
}

/// Wraps a page fetcher with pagination routing.
///
/// See [`PaginatedMethod`].
#[must_use]
pub fn extend<T, F>(fetcher: F) -> PaginatedMethod<T>
where
    T: Send + 'static,
    F: PageFetcher<T> + 'static,
{
    PaginatedMethod {
        fetcher: Arc::new(fetcher),
    }
}

/// A list method with every call shape the router supports.
///
/// # Example
///
/// ```rust
/// use cloud_core::paginator::{extend, Argument, Page};
/// use cloud_core::Error;
/// use serde_json::{json, Value};
///
/// # tokio_test::block_on(async {
/// let list = extend(|query: Value| async move {
///     let more = query.get("token").is_none();
///     Ok::<_, Error>(Page::new(vec![more], more.then(|| json!({"token": "t"}))))
/// });
///
/// assert_eq!(list.all(json!({})).await.unwrap(), vec![true, false]);
///
/// let routed = list.call(vec![Argument::Query(json!({}))]).await;
/// assert!(!routed.is_delivered());
/// # });
/// ```
pub struct PaginatedMethod<T: Send + 'static> {
    fetcher: Arc<dyn PageFetcher<T>>,
}

impl<T: Send + 'static> PaginatedMethod<T> {
    /// Wraps an already shared fetcher.
    #[must_use]
    pub fn from_shared(fetcher: Arc<dyn PageFetcher<T>>) -> Self {
        Self { fetcher }
    }

    /// Returns the underlying fetcher.
    #[must_use]
    pub const fn fetcher(&self) -> &Arc<dyn PageFetcher<T>> {
        &self.fetcher
    }

    /// Parses flexible-shape arguments and routes the call.
    pub async fn call(&self, args: Vec<Argument<T>>) -> Routed<T> {
        self.route(parse_arguments(args)).await
    }

    /// Routes a call with explicit arguments.
    pub async fn route(&self, args: ParsedArguments<T>) -> Routed<T> {
        router(args, Arc::clone(&self.fetcher)).await
    }

    /// Returns the lazy item stream for `query`.
    ///
    /// `maxResults`, `limitVal` or `pageSize` in the query cap the stream.
    #[must_use]
    pub fn stream(&self, query: Value) -> PageStream<T> {
        run_as_stream(
            parse_arguments(vec![Argument::Query(query)]),
            Arc::clone(&self.fetcher),
        )
    }

    /// Collects every item for `query`.
    ///
    /// # Errors
    ///
    /// Returns the first page fetch error; no partial results are returned.
    pub async fn all(&self, query: Value) -> Result<Vec<T>, Error> {
        self.stream(query).try_collect().await
    }

    /// Fetches exactly one page for `query`.
    ///
    /// # Errors
    ///
    /// Returns the page fetch error.
    pub async fn page(&self, query: Value) -> Result<Page<T>, Error> {
        self.fetcher.fetch_page(query).await
    }
}

impl<T: Send + 'static> Clone for PaginatedMethod<T> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

impl<T: Send + 'static> fmt::Debug for PaginatedMethod<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginatedMethod").finish_non_exhaustive()
    }
}
