//! Lazy, pull-driven item stream over a paginated list method.

use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::stream::{FusedStream, Stream};
use serde_json::Value;

use crate::clients::HttpResponse;
use crate::error::Error;
use crate::paginator::{is_truthy, Page, PageFetcher};

enum State<T> {
    Idle,
    Fetching(BoxFuture<'static, Result<Page<T>, Error>>),
    Finished,
}

/// A single-use stream of list items, fetched page by page on demand.
///
/// No page is requested until the stream is first polled, and a new page is
/// requested only once the previous page's items have been consumed. At most
/// one fetch is in flight at a time. The stream ends when a page carries no
/// continuation query, when `max_results` items have been yielded, or after
/// the first error, which is yielded exactly once.
///
/// Dropping the stream or calling [`close`](Self::close) stops it: buffered
/// items are discarded and no further page is requested.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use cloud_core::paginator::{Page, PageStream};
/// use cloud_core::Error;
/// use futures::TryStreamExt;
/// use serde_json::{json, Value};
///
/// # tokio_test::block_on(async {
/// let fetcher = |query: Value| async move {
///     let next = query.get("page").and_then(Value::as_u64).unwrap_or(0) + 1;
///     let next_query = (next < 3).then(|| json!({"page": next}));
///     Ok::<_, Error>(Page::new(vec![next], next_query))
/// };
///
/// let stream: PageStream<u64> = PageStream::new(Arc::new(fetcher), json!({}), None);
/// let items: Vec<u64> = stream.try_collect().await.unwrap();
/// assert_eq!(items, vec![1, 2, 3]);
/// # });
/// ```
pub struct PageStream<T: Send + 'static> {
    fetcher: Arc<dyn PageFetcher<T>>,
    state: State<T>,
    buffer: VecDeque<T>,
    next_query: Option<Value>,
    max_results: Option<u64>,
    emitted: u64,
    pages: u64,
    last_response: Option<HttpResponse>,
}

// Items are moved out of the buffer, never pinned in place.
impl<T: Send + 'static> Unpin for PageStream<T> {}

impl<T: Send + 'static> PageStream<T> {
    /// Creates a stream whose first page is fetched with `query`.
    ///
    /// `max_results` caps the number of yielded items; `Some(0)` yields
    /// nothing and never fetches.
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher<T>>, query: Value, max_results: Option<u64>) -> Self {
        Self {
            fetcher,
            state: State::Idle,
            buffer: VecDeque::new(),
            next_query: Some(query),
            max_results,
            emitted: 0,
            pages: 0,
            last_response: None,
        }
    }

    /// Stops the stream.
    ///
    /// Buffered items are dropped, an in-flight fetch is abandoned and no
    /// further fetch happens. Subsequent polls yield `None`.
    pub fn close(&mut self) {
        self.finish();
    }

    /// Returns the number of items yielded so far.
    #[must_use]
    pub const fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Returns the number of pages fetched so far.
    #[must_use]
    pub const fn pages_fetched(&self) -> u64 {
        self.pages
    }

    /// Returns the raw response of the most recently fetched page.
    #[must_use]
    pub const fn last_response(&self) -> Option<&HttpResponse> {
        self.last_response.as_ref()
    }

    fn cap_reached(&self) -> bool {
        self.max_results.is_some_and(|max| self.emitted >= max)
    }

    fn finish(&mut self) {
        if matches!(self.state, State::Finished) {
            return;
        }
        tracing::debug!(
            emitted = self.emitted,
            pages = self.pages,
            "page stream finished"
        );
        self.state = State::Finished;
        self.buffer.clear();
        self.next_query = None;
    }
}

impl<T: Send + 'static> Stream for PageStream<T> {
    type Item = Result<T, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if matches!(this.state, State::Finished) {
                return Poll::Ready(None);
            }
            if this.cap_reached() {
                this.finish();
                return Poll::Ready(None);
            }
            if let Some(item) = this.buffer.pop_front() {
                this.emitted += 1;
                return Poll::Ready(Some(Ok(item)));
            }

            match &mut this.state {
                State::Idle => {
                    let Some(query) = this.next_query.take() else {
                        this.finish();
                        return Poll::Ready(None);
                    };
                    tracing::debug!(page = this.pages + 1, "fetching page");
                    let fetcher = Arc::clone(&this.fetcher);
                    this.state =
                        State::Fetching(Box::pin(async move { fetcher.fetch_page(query).await }));
                }
                State::Fetching(fetch) => match fetch.as_mut().poll(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(Ok(page)) => {
                        this.state = State::Idle;
                        this.pages += 1;
                        if page.response.is_some() {
                            this.last_response = page.response;
                        }
                        this.next_query = page.next_query.filter(is_truthy);
                        this.buffer.extend(page.items);
                    }
                    Poll::Ready(Err(error)) => {
                        tracing::debug!(%error, "page fetch failed");
                        this.finish();
                        return Poll::Ready(Some(Err(error)));
                    }
                },
                State::Finished => return Poll::Ready(None),
            }
        }
    }
}

impl<T: Send + 'static> FusedStream for PageStream<T> {
    fn is_terminated(&self) -> bool {
        matches!(self.state, State::Finished)
    }
}

impl<T: Send + 'static> fmt::Debug for PageStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            State::Idle => "idle",
            State::Fetching(_) => "fetching",
            State::Finished => "finished",
        };
        f.debug_struct("PageStream")
            .field("state", &state)
            .field("buffered", &self.buffer.len())
            .field("next_query", &self.next_query)
            .field("max_results", &self.max_results)
            .field("emitted", &self.emitted)
            .field("pages", &self.pages)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{StreamExt, TryStreamExt};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Pages {
        pages: Vec<Result<Page<&'static str>, u16>>,
        calls: AtomicUsize,
        queries: parking_lot::Mutex<Vec<Value>>,
    }

    impl Pages {
        fn new(pages: Vec<Result<Page<&'static str>, u16>>) -> Arc<Self> {
            Arc::new(Self {
                pages,
                calls: AtomicUsize::new(0),
                queries: parking_lot::Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl PageFetcher<&'static str> for Pages {
        async fn fetch_page(&self, query: Value) -> Result<Page<&'static str>, Error> {
            let index = self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().push(query);
            match &self.pages[index] {
                Ok(page) => Ok(page.clone()),
                Err(code) => Err(crate::clients::HttpError::Response(
                    crate::clients::HttpResponseError {
                        code: *code,
                        message: "boom".to_string(),
                        error_reference: None,
                        response: None,
                    },
                )
                .into()),
            }
        }
    }

    fn three_pages() -> Arc<Pages> {
        Pages::new(vec![
            Ok(Page::new(vec!["a"], Some(json!({"n": 1})))),
            Ok(Page::new(vec!["b"], Some(json!({"n": 2})))),
            Ok(Page::new(vec!["c"], None)),
        ])
    }

    #[tokio::test]
    async fn test_streams_all_pages_in_order() {
        let pages = three_pages();
        let stream = PageStream::new(pages.clone(), json!({}), None);

        let items: Vec<_> = stream.try_collect().await.unwrap();

        assert_eq!(items, vec!["a", "b", "c"]);
        assert_eq!(pages.calls(), 3);
        assert_eq!(
            *pages.queries.lock(),
            vec![json!({}), json!({"n": 1}), json!({"n": 2})]
        );
    }

    #[tokio::test]
    async fn test_cap_stops_mid_page_after_one_fetch() {
        let pages = Pages::new(vec![Ok(Page::new(vec!["a", "b", "c"], Some(json!({"n": 1}))))]);
        let mut stream = PageStream::new(pages.clone(), json!({}), Some(1));

        assert_eq!(stream.next().await.unwrap().unwrap(), "a");
        assert!(stream.next().await.is_none());
        assert!(stream.is_terminated());
        assert_eq!(pages.calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_cap_never_fetches() {
        let pages = three_pages();
        let mut stream = PageStream::new(pages.clone(), json!({}), Some(0));

        assert!(stream.next().await.is_none());
        assert_eq!(pages.calls(), 0);
    }

    #[tokio::test]
    async fn test_error_is_yielded_once_then_ends() {
        let pages = Pages::new(vec![
            Ok(Page::new(vec!["a"], Some(json!({"n": 1})))),
            Err(500),
        ]);
        let mut stream = PageStream::new(pages.clone(), json!({}), None);

        assert_eq!(stream.next().await.unwrap().unwrap(), "a");
        let error = stream.next().await.unwrap().unwrap_err();
        assert_eq!(error.code(), Some(500));
        assert!(stream.next().await.is_none());
        assert_eq!(pages.calls(), 2);
    }

    #[tokio::test]
    async fn test_close_drops_buffer_and_stops_fetching() {
        let pages = Pages::new(vec![Ok(Page::new(vec!["a", "b"], Some(json!({"n": 1}))))]);
        let mut stream = PageStream::new(pages.clone(), json!({}), None);

        assert_eq!(stream.next().await.unwrap().unwrap(), "a");
        stream.close();

        assert!(stream.next().await.is_none());
        assert_eq!(stream.emitted(), 1);
        assert_eq!(pages.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_pages_are_skipped() {
        let pages = Pages::new(vec![
            Ok(Page::new(vec![], Some(json!({"n": 1})))),
            Ok(Page::new(vec!["b"], Some(json!("")))),
        ]);
        let items: Vec<_> = PageStream::new(pages.clone(), json!({}), None)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(items, vec!["b"]);
        assert_eq!(pages.calls(), 2);
    }

    #[tokio::test]
    async fn test_last_response_tracks_latest_page() {
        let response = HttpResponse::new(200, HashMap::new(), json!({"page": 1}));
        let pages = Pages::new(vec![Ok(Page::new(vec!["a"], None).with_response(response))]);
        let mut stream = PageStream::new(pages, json!({}), None);

        while stream.next().await.is_some() {}

        assert_eq!(
            stream.last_response().map(|r| r.body.clone()),
            Some(json!({"page": 1}))
        );
        assert_eq!(stream.pages_fetched(), 1);
    }

    #[test]
    fn test_nothing_is_fetched_before_first_poll() {
        let pages = three_pages();
        let mut stream = tokio_test::task::spawn(PageStream::new(pages.clone(), json!({}), None));

        assert_eq!(pages.calls(), 0);
        let first = stream.poll_next();
        assert!(matches!(first, Poll::Ready(Some(Ok("a")))));
        assert_eq!(pages.calls(), 1);
    }
}
