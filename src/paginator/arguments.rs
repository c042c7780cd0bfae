//! Canonical list-call arguments and the flexible-shape parser.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::Error;
use crate::paginator::{ListCallback, Page};

/// Keys consulted for the result cap, highest priority first.
const MAX_RESULTS_KEYS: [&str; 3] = ["maxResults", "limitVal", "pageSize"];

/// Keys that turn auto-pagination off when set to `false`.
const AUTO_PAGINATE_KEYS: [&str; 2] = ["autoPaginate", "autoPaginateVal"];

/// Normalized arguments for a paginated list call.
///
/// # Example
///
/// ```rust
/// use cloud_core::paginator::ParsedArguments;
/// use serde_json::json;
///
/// let args: ParsedArguments<String> = ParsedArguments::new(json!({"filter": "x"}))
///     .max_results(100);
///
/// assert_eq!(args.max_results, Some(100));
/// assert!(args.auto_paginate);
/// ```
pub struct ParsedArguments<T> {
    /// The query passed to the first page fetch. Always a JSON object.
    pub query: Value,
    /// Completion handler; `None` selects stream mode.
    pub callback: Option<ListCallback<T>>,
    /// Cap on emitted items; `None` is unbounded.
    pub max_results: Option<u64>,
    /// Whether continuation queries are followed.
    pub auto_paginate: bool,
}

impl<T> ParsedArguments<T> {
    /// Creates arguments for `query` with no cap, no callback and
    /// auto-pagination on.
    ///
    /// A query that is not a JSON object is replaced with `{}`.
    #[must_use]
    pub fn new(query: Value) -> Self {
        Self {
            query: normalize_query(query),
            callback: None,
            max_results: None,
            auto_paginate: true,
        }
    }

    /// Sets the result cap.
    #[must_use]
    pub const fn max_results(mut self, max_results: u64) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Sets whether continuation queries are followed.
    #[must_use]
    pub const fn auto_paginate(mut self, auto_paginate: bool) -> Self {
        self.auto_paginate = auto_paginate;
        self
    }

    /// Sets the completion handler, selecting callback mode.
    #[must_use]
    pub fn callback(mut self, callback: impl FnOnce(Result<Page<T>, Error>) + Send + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }
}

impl<T> Default for ParsedArguments<T> {
    fn default() -> Self {
        Self::new(Value::Object(Map::new()))
    }
}

impl<T> fmt::Debug for ParsedArguments<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedArguments")
            .field("query", &self.query)
            .field("callback", &self.callback.is_some())
            .field("max_results", &self.max_results)
            .field("auto_paginate", &self.auto_paginate)
            .finish()
    }
}

/// One positional argument of a flexible-shape list call.
pub enum Argument<T> {
    /// A query value.
    Query(Value),
    /// A completion handler.
    Callback(ListCallback<T>),
    /// An explicitly absent argument.
    Undefined,
}

impl<T> Argument<T> {
    /// Wraps a closure as a callback argument.
    #[must_use]
    pub fn callback(callback: impl FnOnce(Result<Page<T>, Error>) + Send + 'static) -> Self {
        Self::Callback(Box::new(callback))
    }

    const fn is_callback(&self) -> bool {
        matches!(self, Self::Callback(_))
    }
}

impl<T> From<Value> for Argument<T> {
    fn from(query: Value) -> Self {
        Self::Query(query)
    }
}

impl<T> fmt::Debug for Argument<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query(query) => f.debug_tuple("Query").field(query).finish(),
            Self::Callback(_) => f.write_str("Callback"),
            Self::Undefined => f.write_str("Undefined"),
        }
    }
}

/// Normalizes a positional argument list into [`ParsedArguments`].
///
/// - A callback in the first position wins; otherwise a callback in the last
///   position is taken. When the first argument is the callback the query
///   is `{}`.
/// - The first non-callback argument is the query. A missing, undefined or
///   non-object query becomes `{}`.
/// - The cap is the first numeric value among `maxResults`, `limitVal` and
///   `pageSize`. A negative value means unbounded.
/// - Auto-pagination is on unless a cap was found or `autoPaginate` /
///   `autoPaginateVal` is `false`.
///
/// Never fails: unexpected shapes fall back to defaults.
///
/// # Example
///
/// ```rust
/// use cloud_core::paginator::{parse_arguments, Argument};
/// use serde_json::json;
///
/// let args = parse_arguments::<String>(vec![
///     Argument::Query(json!({"pageSize": 5})),
///     Argument::callback(|_| {}),
/// ]);
///
/// assert_eq!(args.max_results, Some(5));
/// assert!(!args.auto_paginate);
/// assert!(args.callback.is_some());
/// ```
#[must_use]
pub fn parse_arguments<T>(mut args: Vec<Argument<T>>) -> ParsedArguments<T> {
    let mut callback = None;
    let mut query = Value::Null;

    if args.first().is_some_and(Argument::is_callback) {
        if let Argument::Callback(first) = args.swap_remove(0) {
            callback = Some(first);
        }
    } else {
        if args.last().is_some_and(Argument::is_callback) {
            if let Some(Argument::Callback(last)) = args.pop() {
                callback = Some(last);
            }
        }
        if let Some(Argument::Query(first)) = args.into_iter().next() {
            query = first;
        }
    }

    let query = normalize_query(query);

    let cap = MAX_RESULTS_KEYS
        .iter()
        .find_map(|key| query.get(*key).and_then(Value::as_f64));
    let max_results = cap.and_then(to_cap);

    let auto_paginate_off = AUTO_PAGINATE_KEYS
        .iter()
        .any(|key| query.get(*key) == Some(&Value::Bool(false)));

    ParsedArguments {
        query,
        callback,
        max_results,
        auto_paginate: max_results.is_none() && !auto_paginate_off,
    }
}

fn normalize_query(query: Value) -> Value {
    match query {
        Value::Object(_) => query,
        _ => Value::Object(Map::new()),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_cap(value: f64) -> Option<u64> {
    (value >= 0.0).then(|| value.ceil() as u64)
}
