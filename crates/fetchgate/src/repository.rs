// ── Repository core ──
//
// One repository owns one logical resource: a cached latest request,
// a collaborator-supplied asynchronous dispatch, and the `DataSource`
// the outcome is published into. The repository itself performs no IO
// and imposes no threading model.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::debug;

use crate::result::FetchResult;
use crate::source::DataSource;
use crate::state::UiState;
use crate::stream::StateStream;

/// The capability set a concrete resource supplies to a [`Repository`].
///
/// `dispatch` is the only required method: it starts the asynchronous
/// fetch (typically by spawning a task) and must eventually call
/// [`Completion::resolve`] exactly once, on whatever execution context
/// the work completes on. It must not block the caller.
pub trait Fetcher: Send + Sync + 'static {
    type Req: Send + Sync + 'static;
    type Res: Clone + Send + Sync + 'static;

    /// Start the asynchronous fetch for `request`.
    fn dispatch(&self, request: Option<Arc<Self::Req>>, completion: Completion<Self::Res>);

    /// Hook for folding an incoming request before it is cached as the
    /// "latest request". Identity by default.
    fn cache_request(&self, request: Option<Arc<Self::Req>>) -> Option<Arc<Self::Req>> {
        request
    }

    /// Staleness policy consulted by activation-style consumers (never
    /// by [`Repository::fetch`] itself). Default: always refetch.
    fn is_need_update(&self, _data_age: Option<chrono::Duration>) -> bool {
        true
    }
}

// ── Completion ───────────────────────────────────────────────────

type Merge<T> = Box<dyn FnOnce(FetchResult<T>) -> FetchResult<T> + Send>;

/// Resolve-once handle a dispatch implementor uses to report its
/// outcome.
///
/// Consuming `self` in [`resolve`](Self::resolve) makes a double push
/// impossible; resolving exactly once per admitted dispatch remains the
/// implementor's side of the contract. Failures are values: resolving
/// with an error is a normal publish, not an exceptional path.
pub struct Completion<T: Clone + Send + Sync + 'static> {
    source: DataSource<T>,
    merge: Option<Merge<T>>,
}

impl<T: Clone + Send + Sync + 'static> Completion<T> {
    pub(crate) fn new(source: DataSource<T>) -> Self {
        Self {
            source,
            merge: None,
        }
    }

    pub(crate) fn with_merge(source: DataSource<T>, merge: Merge<T>) -> Self {
        Self {
            source,
            merge: Some(merge),
        }
    }

    /// Republish the current snapshot with `loading` raised. Call this
    /// before starting the actual IO.
    pub fn mark_loading(&self) {
        self.source.mark_loading();
    }

    /// Fold the outcome into the published state. For paging
    /// completions the success payload is first merged with the
    /// accumulated pages.
    pub fn resolve(self, result: FetchResult<T>) {
        let result = match self.merge {
            Some(merge) => merge(result),
            None => result,
        };
        self.source.push(result);
    }
}

// ── Repository ───────────────────────────────────────────────────

/// Fetch coordinator for a single logical resource.
///
/// Holds the latest-request cache and the [`DataSource`] observers
/// subscribe to. `fetch` and `refresh` never block: admission is
/// synchronous, the dispatch work and its eventual publish happen
/// asynchronously, possibly on another thread.
///
/// Two concurrent dispatches on a plain `Repository` race on the
/// publish with last-write-wins semantics; use
/// [`PagingRepository`](crate::PagingRepository) where single-flight
/// deduplication is required.
pub struct Repository<F: Fetcher> {
    fetcher: Arc<F>,
    latest_request: ArcSwapOption<F::Req>,
    source: DataSource<F::Res>,
}

impl<F: Fetcher> Repository<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            latest_request: ArcSwapOption::empty(),
            source: DataSource::new(),
        }
    }

    /// Create with an initial request already cached, so the first
    /// `refresh()` has something to re-dispatch.
    pub fn with_initial_request(fetcher: F, request: F::Req) -> Self {
        let repo = Self::new(fetcher);
        repo.latest_request.store(Some(Arc::new(request)));
        repo
    }

    /// The observable container this repository publishes into.
    pub fn data_source(&self) -> &DataSource<F::Res> {
        &self.source
    }

    /// Subscribe to published snapshots.
    pub fn subscribe(&self) -> StateStream<F::Res> {
        self.source.subscribe()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> UiState<F::Res> {
        self.source.snapshot()
    }

    /// The cached latest request, if any. Read-only: the cache is
    /// written only through `fetch`.
    pub fn latest_request(&self) -> Option<Arc<F::Req>> {
        self.latest_request.load_full()
    }

    /// Re-dispatch the cached latest request (request `None` if no
    /// fetch has ever cached one).
    pub fn refresh(&self) {
        let cached = self.latest_request.load_full();
        debug!(cached = cached.is_some(), "refresh");
        self.fetcher
            .dispatch(cached, Completion::new(self.source.clone()));
    }

    /// Cache the (possibly folded) request and start a dispatch.
    ///
    /// The cache receives `cache_request(request)`; the dispatch sees
    /// the request exactly as the caller passed it.
    pub fn fetch(&self, request: Option<F::Req>) {
        let request = request.map(Arc::new);
        self.latest_request
            .store(self.fetcher.cache_request(request.clone()));
        self.fetcher
            .dispatch(request, Completion::new(self.source.clone()));
    }

    /// Whether the resource is stale enough to warrant a refetch,
    /// according to the fetcher's policy and the current data age.
    pub fn is_need_update(&self) -> bool {
        self.fetcher.is_need_update(self.source.data_age())
    }

    pub fn fetcher(&self) -> &Arc<F> {
        &self.fetcher
    }
}
