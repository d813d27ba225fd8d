// ── Error model ──
//
// A single opaque error kind carried inside `FetchResult::Error` and
// `UiState::exception`. The core treats every failure uniformly -- it
// never branches on variant. Categorisation exists purely so that
// collaborators rendering a `UiState` can show something useful.

use serde::Serialize;
use thiserror::Error;

/// Opaque failure description for a fetch.
///
/// Failures are values here, not control flow: a dispatch that fails
/// wraps its error in [`FetchResult::Error`](crate::FetchResult::Error)
/// and pushes it through the normal publishing path.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ErrorKind {
    /// The collaborator's asynchronous operation failed outright.
    #[error("Fetch failed: {message}")]
    Fetch { message: String },

    /// The operation completed but its response could not be interpreted.
    #[error("Response could not be decoded: {message}")]
    Decode { message: String },

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl ErrorKind {
    /// Shorthand for a [`ErrorKind::Fetch`] with the given message.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Shorthand for a [`ErrorKind::Decode`] with the given message.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}
