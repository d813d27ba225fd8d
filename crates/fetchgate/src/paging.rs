// ── Paging repository ──
//
// Decorates the repository contract with an atomic busy gate, next-page
// request derivation, and page accumulation. The gate guarantees at
// most one in-flight dispatch per instance, which is what makes the
// request cache and publish path race-free here.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwapOption;
use tracing::{debug, trace};

use crate::repository::{Completion, Fetcher};
use crate::result::FetchResult;
use crate::source::DataSource;
use crate::state::UiState;
use crate::stream::StateStream;

/// The larger capability set a paged resource supplies.
///
/// `is_terminal` is a latch: once it returns `true` the repository
/// never admits another dispatch for the rest of its lifetime.
pub trait Pager: Fetcher {
    type Item: Send + Sync + 'static;

    /// Page size the resource is fetched in.
    fn page_limit(&self) -> usize;

    /// The content accumulated so far.
    fn current_items(&self) -> Vec<Self::Item>;

    /// Merge a freshly fetched page into the running result.
    fn merge_page(&self, current: Vec<Self::Item>, page: Self::Res) -> Self::Res;

    /// Translate a 1-based offset (accumulated count + 1) into the next
    /// page request. `None` signals "nothing further to request", which
    /// is distinct from [`is_terminal`](Self::is_terminal).
    fn next_request(&self, offset: usize, latest: Option<Arc<Self::Req>>) -> Option<Self::Req>;

    /// Whether the final page has been reached. Must never transition
    /// back to `false` once `true`.
    fn is_terminal(&self) -> bool;
}

/// Single-flight fetch coordinator for a paged resource.
///
/// Admission is an atomic compare-and-set on the busy flag plus a
/// terminal check; rejected calls are silently dropped -- no queueing,
/// no error. The collaborator must call [`release`](Self::release)
/// exactly once per admitted dispatch, after resolving the completion;
/// forgetting it permanently wedges the instance (a programming error
/// to be caught by tests, not a recoverable runtime fault).
pub struct PagingRepository<P: Pager> {
    pager: Arc<P>,
    latest_request: ArcSwapOption<P::Req>,
    source: DataSource<P::Res>,
    busy: AtomicBool,
}

impl<P: Pager> PagingRepository<P> {
    pub fn new(pager: P) -> Self {
        Self {
            pager: Arc::new(pager),
            latest_request: ArcSwapOption::empty(),
            source: DataSource::new(),
            busy: AtomicBool::new(false),
        }
    }

    /// Create with an initial request already cached.
    pub fn with_initial_request(pager: P, request: P::Req) -> Self {
        let repo = Self::new(pager);
        repo.latest_request.store(Some(Arc::new(request)));
        repo
    }

    /// The observable container this repository publishes into.
    pub fn data_source(&self) -> &DataSource<P::Res> {
        &self.source
    }

    /// Subscribe to published snapshots.
    pub fn subscribe(&self) -> StateStream<P::Res> {
        self.source.subscribe()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> UiState<P::Res> {
        self.source.snapshot()
    }

    /// The cached latest request, if any.
    pub fn latest_request(&self) -> Option<Arc<P::Req>> {
        self.latest_request.load_full()
    }

    /// Whether a dispatch is currently in flight. Useful for UI
    /// affordances such as disabling a "load more" button.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Fetch through the admission gate.
    ///
    /// Proceeds only if the resource is not terminal and the busy flag
    /// transitions false→true; otherwise the call is dropped with no
    /// dispatch and no state change. The request cache is updated only
    /// inside the admitted branch, so rejected callers can never
    /// clobber the cache of the in-flight request.
    pub fn fetch(&self, request: Option<P::Req>) {
        if self.pager.is_terminal() {
            trace!("fetch rejected: terminal");
            return;
        }
        if !self.try_admit() {
            trace!("fetch rejected: dispatch in flight");
            return;
        }

        let request = request.map(Arc::new);
        self.latest_request
            .store(self.pager.cache_request(request.clone()));
        debug!("dispatch admitted");
        self.pager.dispatch(request, self.completion());
    }

    /// Derive and fetch the next page.
    ///
    /// The offset is 1-based: with 4 items accumulated the next request
    /// is derived for offset 5. A `None` from
    /// [`next_request`](Pager::next_request) makes this a no-op.
    pub fn fetch_next_page(&self) {
        let offset = self.pager.current_items().len() + 1;
        match self
            .pager
            .next_request(offset, self.latest_request.load_full())
        {
            Some(request) => self.fetch(Some(request)),
            None => trace!(offset, "no further page to request"),
        }
    }

    /// Re-dispatch the cached latest request, through the same
    /// admission gate as [`fetch`](Self::fetch). Does not rewrite the
    /// cache.
    pub fn refresh(&self) {
        if self.pager.is_terminal() || !self.try_admit() {
            trace!("refresh rejected");
            return;
        }
        let cached = self.latest_request.load_full();
        debug!(cached = cached.is_some(), "refresh admitted");
        self.pager.dispatch(cached, self.completion());
    }

    /// Clear the busy flag unconditionally.
    ///
    /// Caller obligation: exactly once per admitted dispatch, after the
    /// completion has been resolved, on success and failure alike.
    pub fn release(&self) {
        self.busy.store(false, Ordering::Release);
        trace!("released");
    }

    /// Whether the resource is stale enough to warrant a refetch.
    pub fn is_need_update(&self) -> bool {
        self.pager.is_need_update(self.source.data_age())
    }

    pub fn pager(&self) -> &Arc<P> {
        &self.pager
    }

    fn try_admit(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Completion whose success path merges the new page into the
    /// accumulated content before publishing.
    fn completion(&self) -> Completion<P::Res> {
        let pager = Arc::clone(&self.pager);
        Completion::with_merge(
            self.source.clone(),
            Box::new(move |result| match result {
                FetchResult::Success(page) => {
                    FetchResult::Success(pager.merge_page(pager.current_items(), page))
                }
                err @ FetchResult::Error(_) => err,
            }),
        )
    }
}
