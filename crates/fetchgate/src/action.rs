// ── IO action wiring ──
//
// Couples a `UiState` snapshot with the trigger that produces it, so a
// view receives one value per mutation affordance instead of parallel
// (state, callback) argument lists. One shared watch cell holds the
// state; triggers fold fresh results into it via `copy_with_result`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::trace;

use crate::result::FetchResult;
use crate::state::UiState;

type Trigger<T> = Arc<dyn Fn(ResultSink<T>) + Send + Sync>;

// ── ResultSink ───────────────────────────────────────────────────

/// Resolve-once callback handed to a trigger implementor.
///
/// The implementor performs its asynchronous work and reports the
/// outcome here; the sink folds it into the shared snapshot and
/// republishes.
pub struct ResultSink<T> {
    state: watch::Sender<Option<UiState<T>>>,
}

impl<T: Clone + Send + Sync + 'static> ResultSink<T> {
    pub fn resolve(self, result: FetchResult<T>) {
        self.state.send_modify(|slot| {
            let prior = slot.take().unwrap_or_default();
            *slot = Some(prior.copy_with_result(result));
        });
    }
}

fn raise_loading<T: Clone + Send + Sync + 'static>(state: &watch::Sender<Option<UiState<T>>>) {
    state.send_modify(|slot| {
        let mut next = slot.take().unwrap_or_default();
        next.loading = true;
        *slot = Some(next);
    });
}

// ── Zero-argument action ─────────────────────────────────────────

/// A `UiState` snapshot paired with the zero-argument trigger that
/// refreshes it.
#[derive(Clone)]
pub struct IoAction<T> {
    result: Option<UiState<T>>,
    send: Arc<dyn Fn() + Send + Sync>,
}

impl<T> IoAction<T> {
    /// The snapshot captured when this entity was produced.
    pub fn result(&self) -> Option<&UiState<T>> {
        self.result.as_ref()
    }

    /// Invoke the IO this action stands for.
    pub fn send(&self) {
        (self.send)();
    }
}

/// Produces [`IoAction`] entities sharing one state cell.
///
/// `send_factory` is the collaborator side: it receives a
/// [`ResultSink`] on every trigger and must eventually resolve it with
/// a fresh [`FetchResult`]. Triggering marks the shared snapshot as
/// loading before the factory runs.
pub struct IoActionFactory<T: Clone + Send + Sync + 'static> {
    state: watch::Sender<Option<UiState<T>>>,
    send_factory: Arc<dyn Fn(ResultSink<T>) + Send + Sync>,
}

impl<T: Clone + Send + Sync + 'static> IoActionFactory<T> {
    pub fn new(send_factory: impl Fn(ResultSink<T>) + Send + Sync + 'static) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            state,
            send_factory: Arc::new(send_factory),
        }
    }

    /// The current shared snapshot.
    pub fn snapshot(&self) -> Option<UiState<T>> {
        self.state.borrow().clone()
    }

    /// Observe the shared snapshot as it changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<UiState<T>>> {
        self.state.subscribe()
    }

    /// Trigger the IO directly.
    pub fn send(&self) {
        raise_loading(&self.state);
        (self.send_factory)(ResultSink {
            state: self.state.clone(),
        });
    }

    /// Pair the current snapshot with the trigger.
    pub fn entity(&self) -> IoAction<T> {
        let state = self.state.clone();
        let send_factory = Arc::clone(&self.send_factory);
        IoAction {
            result: self.snapshot(),
            send: Arc::new(move || {
                raise_loading(&state);
                send_factory(ResultSink {
                    state: state.clone(),
                });
            }),
        }
    }
}

// ── Discriminated action ─────────────────────────────────────────

/// Same pattern as [`IoAction`], but the trigger takes a discriminator
/// so several distinct UI affordances can share one result slot.
#[derive(Clone)]
pub struct IoComplexAction<T, K> {
    result: Option<UiState<T>>,
    send: Arc<dyn Fn(K) + Send + Sync>,
}

impl<T, K> IoComplexAction<T, K> {
    pub fn result(&self) -> Option<&UiState<T>> {
        self.result.as_ref()
    }

    pub fn send(&self, variant: K) {
        (self.send)(variant);
    }
}

/// Builder registering one trigger closure per discriminator variant.
pub struct IoComplexActionBuilder<T, K> {
    triggers: HashMap<K, Trigger<T>>,
}

impl<T, K> Default for IoComplexActionBuilder<T, K> {
    fn default() -> Self {
        Self {
            triggers: HashMap::new(),
        }
    }
}

impl<T, K> IoComplexActionBuilder<T, K>
where
    T: Clone + Send + Sync + 'static,
    K: Eq + std::hash::Hash + Clone + Send + Sync + 'static,
{
    pub fn on(mut self, variant: K, trigger: impl Fn(ResultSink<T>) + Send + Sync + 'static) -> Self {
        self.triggers.insert(variant, Arc::new(trigger));
        self
    }

    pub fn build(self) -> IoComplexActionFactory<T, K> {
        let (state, _) = watch::channel(None);
        IoComplexActionFactory {
            state,
            triggers: Arc::new(self.triggers),
        }
    }
}

/// Produces [`IoComplexAction`] entities whose triggers all fold into
/// one shared state cell.
pub struct IoComplexActionFactory<T: Clone + Send + Sync + 'static, K> {
    state: watch::Sender<Option<UiState<T>>>,
    triggers: Arc<HashMap<K, Trigger<T>>>,
}

impl<T, K> IoComplexActionFactory<T, K>
where
    T: Clone + Send + Sync + 'static,
    K: Eq + std::hash::Hash + Clone + Send + Sync + 'static,
{
    pub fn builder() -> IoComplexActionBuilder<T, K> {
        IoComplexActionBuilder::default()
    }

    pub fn snapshot(&self) -> Option<UiState<T>> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UiState<T>>> {
        self.state.subscribe()
    }

    /// Trigger the IO registered for `variant`. Unregistered variants
    /// are no-ops.
    pub fn send(&self, variant: &K) {
        let Some(trigger) = self.triggers.get(variant) else {
            trace!("no trigger registered for variant");
            return;
        };
        raise_loading(&self.state);
        trigger(ResultSink {
            state: self.state.clone(),
        });
    }

    pub fn entity(&self) -> IoComplexAction<T, K> {
        let state = self.state.clone();
        let triggers = Arc::clone(&self.triggers);
        IoComplexAction {
            result: self.snapshot(),
            send: Arc::new(move |variant: K| {
                let Some(trigger) = triggers.get(&variant) else {
                    trace!("no trigger registered for variant");
                    return;
                };
                raise_loading(&state);
                trigger(ResultSink {
                    state: state.clone(),
                });
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn entity_send_marks_loading_then_resolves() {
        let parked: Arc<Mutex<Vec<ResultSink<i32>>>> = Arc::new(Mutex::new(Vec::new()));
        let sinks = Arc::clone(&parked);
        let factory = IoActionFactory::new(move |sink| sinks.lock().unwrap().push(sink));

        let action = factory.entity();
        assert!(action.result().is_none());

        action.send();
        assert!(factory.snapshot().unwrap().loading);

        let sink = parked.lock().unwrap().pop().unwrap();
        sink.resolve(FetchResult::Success(9));

        let snap = factory.snapshot().unwrap();
        assert_eq!(snap.data, Some(9));
        assert!(!snap.loading);
    }

    #[test]
    fn error_result_keeps_prior_data() {
        let parked: Arc<Mutex<Vec<ResultSink<i32>>>> = Arc::new(Mutex::new(Vec::new()));
        let sinks = Arc::clone(&parked);
        let factory = IoActionFactory::new(move |sink| sinks.lock().unwrap().push(sink));

        factory.send();
        parked.lock().unwrap().pop().unwrap().resolve(FetchResult::Success(1));

        factory.send();
        parked
            .lock()
            .unwrap()
            .pop()
            .unwrap()
            .resolve(FetchResult::Error(ErrorKind::fetch("down")));

        let snap = factory.snapshot().unwrap();
        assert_eq!(snap.data, Some(1));
        assert!(snap.has_error());
    }

    #[test]
    fn entity_captures_snapshot_at_creation() {
        let factory: IoActionFactory<i32> = IoActionFactory::new(|sink| {
            sink.resolve(FetchResult::Success(5));
        });
        factory.send();

        let entity = factory.entity();
        assert_eq!(entity.result().unwrap().data, Some(5));
    }

    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    enum Button {
        Approve,
        Reject,
        Unwired,
    }

    #[test]
    fn complex_variants_share_one_result_slot() {
        let factory = IoComplexActionFactory::<&'static str, Button>::builder()
            .on(Button::Approve, |sink| {
                sink.resolve(FetchResult::Success("approved"));
            })
            .on(Button::Reject, |sink| {
                sink.resolve(FetchResult::Success("rejected"));
            })
            .build();

        let action = factory.entity();
        action.send(Button::Approve);
        assert_eq!(factory.snapshot().unwrap().data, Some("approved"));

        action.send(Button::Reject);
        assert_eq!(factory.snapshot().unwrap().data, Some("rejected"));
    }

    #[test]
    fn unregistered_variant_is_a_no_op() {
        let factory = IoComplexActionFactory::<&'static str, Button>::builder()
            .on(Button::Approve, |sink| {
                sink.resolve(FetchResult::Success("approved"));
            })
            .build();

        factory.send(&Button::Unwired);
        assert!(factory.snapshot().is_none());
    }

    #[tokio::test]
    async fn subscribers_observe_the_fold() {
        let factory: IoActionFactory<i32> = IoActionFactory::new(|sink| {
            sink.resolve(FetchResult::Success(3));
        });
        let mut rx = factory.subscribe();

        factory.send();
        rx.changed().await.unwrap();
        // Loading flip and resolve may coalesce in a watch channel;
        // the latest value is what matters.
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().data, Some(3));
    }
}
