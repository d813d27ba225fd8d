// ── UI state snapshot ──
//
// The tri-state (data / loading / error) snapshot published to
// observers. Replaced wholesale on every dispatch completion, never
// partially mutated in place.

use serde::Serialize;

use crate::error::ErrorKind;
use crate::result::FetchResult;

/// One observable snapshot of a remote resource.
///
/// The three facets are orthogonal: `data` is the last good value,
/// `loading` says whether a fetch is in flight, `exception` is the last
/// failure. In particular a snapshot can carry stale data *and* an
/// error at the same time -- the UI keeps showing last-good data while
/// flagging the failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub exception: Option<ErrorKind>,
}

impl<T> Default for UiState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            exception: None,
        }
    }
}

impl<T> UiState<T> {
    /// An empty snapshot already marked as loading -- the usual state
    /// a repository publishes before its first dispatch completes.
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// True iff the snapshot carries an error.
    pub fn has_error(&self) -> bool {
        self.exception.is_some()
    }

    /// True iff this is the very first load: no data yet, a fetch in
    /// flight, and nothing has failed.
    pub fn initial_load(&self) -> bool {
        self.data.is_none() && self.loading && !self.has_error()
    }

    /// Fold a fetch outcome into this snapshot.
    ///
    /// Success replaces the data and clears both `loading` and
    /// `exception`; error records the failure and clears `loading`,
    /// leaving `data` untouched.
    pub fn copy_with_result(self, result: FetchResult<T>) -> Self {
        match result {
            FetchResult::Success(data) => Self {
                data: Some(data),
                loading: false,
                exception: None,
            },
            FetchResult::Error(exception) => Self {
                loading: false,
                exception: Some(exception),
                ..self
            },
        }
    }

    /// Same flags, different payload type.
    pub fn convert<N>(self, new_data: Option<N>) -> UiState<N> {
        UiState {
            data: new_data,
            loading: self.loading,
            exception: self.exception,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn state(data: Option<i32>, loading: bool, failed: bool) -> UiState<i32> {
        UiState {
            data,
            loading,
            exception: failed.then(|| ErrorKind::fetch("boom")),
        }
    }

    #[test]
    fn copy_with_result_success_replaces_data_and_clears_flags() {
        let prior = UiState {
            data: Some(1),
            loading: true,
            exception: None,
        };
        let next = prior.copy_with_result(FetchResult::Success(2));
        assert_eq!(
            next,
            UiState {
                data: Some(2),
                loading: false,
                exception: None,
            }
        );
    }

    #[test]
    fn copy_with_result_error_preserves_stale_data() {
        let prior = UiState {
            data: Some(1),
            loading: true,
            exception: None,
        };
        let next = prior.copy_with_result(FetchResult::Error(ErrorKind::fetch("down")));
        assert_eq!(
            next,
            UiState {
                data: Some(1),
                loading: false,
                exception: Some(ErrorKind::fetch("down")),
            }
        );
    }

    #[test]
    fn copy_with_result_error_also_clears_prior_error_never() {
        // A second consecutive error replaces the first.
        let prior = state(None, true, true);
        let next = prior.copy_with_result(FetchResult::Error(ErrorKind::decode("bad")));
        assert_eq!(next.exception, Some(ErrorKind::decode("bad")));
        assert!(!next.loading);
    }

    #[test]
    fn copy_with_result_success_clears_prior_error() {
        let prior = state(Some(1), false, true);
        let next = prior.copy_with_result(FetchResult::Success(5));
        assert!(!next.has_error());
        assert_eq!(next.data, Some(5));
    }

    #[test]
    fn copy_with_result_is_pure() {
        let prior = state(Some(3), true, false);
        let a = prior.clone().copy_with_result(FetchResult::Success(4));
        let b = prior.copy_with_result(FetchResult::Success(4));
        assert_eq!(a, b);
    }

    #[test]
    fn initial_load_truth_table() {
        // (data present, loading, error present) -> initial_load
        let cases = [
            (false, false, false, false),
            (false, false, true, false),
            (false, true, false, true), // the only true case
            (false, true, true, false),
            (true, false, false, false),
            (true, false, true, false),
            (true, true, false, false),
            (true, true, true, false),
        ];
        for (has_data, loading, failed, expected) in cases {
            let s = state(has_data.then_some(1), loading, failed);
            assert_eq!(
                s.initial_load(),
                expected,
                "data={has_data} loading={loading} failed={failed}"
            );
        }
    }

    #[test]
    fn has_error_mirrors_exception_presence() {
        assert!(state(None, false, true).has_error());
        assert!(!state(Some(1), true, false).has_error());
    }

    #[test]
    fn convert_carries_flags() {
        let s = state(Some(1), true, true);
        let converted: UiState<String> = s.convert(Some("one".into()));
        assert_eq!(converted.data.as_deref(), Some("one"));
        assert!(converted.loading);
        assert!(converted.has_error());
    }
}
