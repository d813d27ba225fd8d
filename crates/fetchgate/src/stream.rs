// ── Reactive state streams ──
//
// Subscription types for consuming `UiState` changes from a
// `DataSource`.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::state::UiState;

/// A subscription to one resource's state.
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via [`changed`](Self::changed) or by converting to a
/// `Stream`.
pub struct StateStream<T: Clone + Send + Sync + 'static> {
    current: UiState<T>,
    receiver: watch::Receiver<UiState<T>>,
}

impl<T: Clone + Send + Sync + 'static> StateStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<UiState<T>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation time (or at the last
    /// [`changed`](Self::changed) call).
    pub fn current(&self) -> &UiState<T> {
        &self.current
    }

    /// The latest snapshot (may have changed since creation).
    pub fn latest(&self) -> UiState<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the publishing `DataSource` has been dropped.
    pub async fn changed(&mut self) -> Option<UiState<T>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> StateWatchStream<T> {
        StateWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields a fresh `UiState<T>` each time the source publishes.
pub struct StateWatchStream<T: Clone + Send + Sync + 'static> {
    inner: WatchStream<UiState<T>>,
}

impl<T: Clone + Send + Sync + 'static> Stream for StateWatchStream<T> {
    type Item = UiState<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // WatchStream is Unpin when the inner type is Unpin, and
        // UiState<T> always is.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
