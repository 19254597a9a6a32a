//! Extraction Error Types
//!
//! A page either has the landmarks the crawl depends on or it does not;
//! nothing in this crate is worth retrying.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An expected structural element is absent from the page.
    #[display("missing page landmark: {_0}")]
    MissingLandmark(#[error(not(source))] &'static str),
    /// A link could not be turned into an absolute URL.
    #[display("invalid URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Markup does not change between two parses of the same bytes.
        false
    }
}
