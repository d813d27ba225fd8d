// fetchgate: reactive single-flight fetch coordination for UI data repositories.
//
// One observable container per logical resource, tracking the latest
// value, an in-flight flag, and the last error -- with duplicate
// concurrent fetches suppressed rather than raced.

pub mod action;
pub mod error;
pub mod paging;
pub mod repository;
pub mod result;
pub mod source;
pub mod state;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use action::{
    IoAction, IoActionFactory, IoComplexAction, IoComplexActionBuilder, IoComplexActionFactory,
    ResultSink,
};
pub use error::ErrorKind;
pub use paging::{Pager, PagingRepository};
pub use repository::{Completion, Fetcher, Repository};
pub use result::FetchResult;
pub use source::DataSource;
pub use state::UiState;
pub use stream::{StateStream, StateWatchStream};
