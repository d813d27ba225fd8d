// ── Fetch outcome ──
//
// Success-or-error value produced by a collaborator's dispatch and fed
// into the publishing path. Never mutated after construction.

use serde::Serialize;

use crate::error::ErrorKind;

/// The outcome of one asynchronous fetch.
///
/// Distinct from `std::result::Result`: the error arm is always
/// [`ErrorKind`], and the type carries UI-facing helpers
/// ([`succeeded`](Self::succeeded), [`success_or`](Self::success_or))
/// rather than combinator soup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FetchResult<T> {
    Success(T),
    Error(ErrorKind),
}

impl<T> FetchResult<T> {
    /// True iff this is a [`Success`](Self::Success) carrying a payload.
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The payload, or `fallback` for any non-success variant.
    pub fn success_or(self, fallback: T) -> T {
        match self {
            Self::Success(data) => data,
            Self::Error(_) => fallback,
        }
    }

    /// The payload by reference, if present.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Error(_) => None,
        }
    }

    /// The error, if present.
    pub fn error(&self) -> Option<&ErrorKind> {
        match self {
            Self::Success(_) => None,
            Self::Error(e) => Some(e),
        }
    }
}

impl<T> From<Result<T, ErrorKind>> for FetchResult<T> {
    fn from(value: Result<T, ErrorKind>) -> Self {
        match value {
            Ok(data) => Self::Success(data),
            Err(e) => Self::Error(e),
        }
    }
}
