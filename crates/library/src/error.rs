//! Library Error Types
//!
//! Whether an error is fatal depends on where it happens: a missing landmark
//! on the book or a part page stops the crawl, the same condition on a
//! chapter only prunes that chapter. The walker makes that call; this module
//! only names the conditions.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A page could not be fetched. Running the crawl again may succeed.
    #[display("could not fetch {url}")]
    Fetch { url: String },
    /// A page was fetched but lacks a landmark the crawl depends on.
    #[display("{url} has no {landmark}")]
    StructuralMismatch { landmark: &'static str, url: String },
    /// An artifact could not be read or written.
    #[display("storage failure at {}", _0.display())]
    Storage(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` for failures that only leave a node empty for this run.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        self.is_transient()
    }
}
