// ── Reactive state container ──
//
// Latest-wins storage for one resource's `UiState`, with push-based
// change notification via a `watch` channel. New subscribers replay
// the current snapshot immediately.

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use crate::result::FetchResult;
use crate::state::UiState;
use crate::stream::StateStream;

/// The observable container one repository publishes into.
///
/// Cheaply cloneable: every clone pushes into (and reads from) the same
/// underlying channel. Writes are serialized by the channel itself, so
/// concurrent pushes resolve to last-write-wins with no torn snapshots.
pub struct DataSource<T> {
    state: watch::Sender<UiState<T>>,
    last_success: watch::Sender<Option<DateTime<Utc>>>,
}

impl<T> Clone for DataSource<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            last_success: self.last_success.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for DataSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> DataSource<T> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(UiState::default());
        let (last_success, _) = watch::channel(None);
        Self {
            state,
            last_success,
        }
    }

    /// The current snapshot (cheap clone of the latest value).
    pub fn snapshot(&self) -> UiState<T> {
        self.state.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> StateStream<T> {
        StateStream::new(self.state.subscribe())
    }

    /// Fold a fetch outcome into the current snapshot and publish the
    /// replacement. Success also stamps [`last_success`](Self::last_success).
    ///
    /// `send_modify` runs under the channel lock, so the
    /// read-fold-replace is atomic even with concurrent pushers.
    pub fn push(&self, result: FetchResult<T>) {
        let succeeded = result.succeeded();
        self.state.send_modify(|state| {
            let prior = std::mem::take(state);
            *state = prior.copy_with_result(result);
        });
        if succeeded {
            self.last_success.send_replace(Some(Utc::now()));
        }
        debug!(succeeded, "published state snapshot");
    }

    /// Republish the current snapshot with `loading` raised. Dispatch
    /// implementors call this before starting IO.
    pub fn mark_loading(&self) {
        self.state.send_modify(|state| state.loading = true);
    }

    /// When the last successful push happened, or `None` if none yet.
    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        *self.last_success.borrow()
    }

    /// How long ago the last successful push happened.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_success().map(|t| Utc::now() - t)
    }
}
