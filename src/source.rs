// src/source.rs - Item source adapters (synchronous lists and async producers)

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("item source failed: {0}")]
    Failed(String),
    #[error("query cancelled")]
    Cancelled,
}

pub type FetchFuture<T> = Pin<Box<dyn Future<Output = Result<Vec<T>, SourceError>> + Send>>;

/// Outcome of asking a source for matches: either a list computed on the
/// spot, or a future the engine will drive to completion. The engine resolves
/// the two cases explicitly instead of inspecting types at the call site.
pub enum Fetch<T> {
    Ready(Vec<T>),
    Pending(FetchFuture<T>),
}

/// A queryable supplier of match candidates.
///
/// `query` receives the search text exactly as typed; case normalization is
/// the engine's business and only applies to cache keys and highlighting.
/// Returned items are kept in source order, the engine never re-sorts them.
pub trait ItemSource<T>: Send {
    fn query(&mut self, text: &str) -> Fetch<T>;
}

/// Closure-backed source. `from_fn` is the usual way to build one.
pub struct FnSource<F>(F);

/// Wrap a closure as an [`ItemSource`]. The closure decides per call whether
/// to answer immediately or hand back a future.
pub fn from_fn<T, F>(f: F) -> FnSource<F>
where
    F: FnMut(&str) -> Fetch<T> + Send,
{
    FnSource(f)
}

impl<T, F> ItemSource<T> for FnSource<F>
where
    F: FnMut(&str) -> Fetch<T> + Send,
{
    fn query(&mut self, text: &str) -> Fetch<T> {
        (self.0)(text)
    }
}

/// Purely asynchronous producer, e.g. a network or index lookup.
#[async_trait]
pub trait AsyncItemSource<T>: Send + Sync + 'static {
    async fn fetch(&self, text: &str) -> Result<Vec<T>, SourceError>;
}

/// Adapter that turns an [`AsyncItemSource`] into an [`ItemSource`] whose
/// every query is `Fetch::Pending`.
pub struct AsyncSource<A> {
    inner: Arc<A>,
}

impl<A> AsyncSource<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

impl<T, A> ItemSource<T> for AsyncSource<A>
where
    T: Send + 'static,
    A: AsyncItemSource<T>,
{
    fn query(&mut self, text: &str) -> Fetch<T> {
        let source = Arc::clone(&self.inner);
        let text = text.to_owned();
        Fetch::Pending(Box::pin(async move { source.fetch(&text).await }))
    }
}

/// Fixed in-memory list answering with a case-insensitive substring filter.
/// Handy for tests and for hosts whose candidate set is already local.
pub struct ListSource {
    items: Vec<String>,
}

impl ListSource {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

impl ItemSource<String> for ListSource {
    fn query(&mut self, text: &str) -> Fetch<String> {
        let needle = text.to_lowercase();
        Fetch::Ready(
            self.items
                .iter()
                .filter(|item| item.to_lowercase().contains(&needle))
                .cloned()
                .collect(),
        )
    }
}
