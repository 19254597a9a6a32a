//! Fetch Error Types
//!
//! Every fetch failure is a transient failure from the crawl's point of view:
//! the node that asked for the page produces nothing this run, and the next
//! run tries again.

use derive_more::{Display, Error};

/// A fetch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a response, or its body could not be read.
    #[display("request failed: {url}")]
    Transport { url: String },
    /// The server answered with a non-success status.
    #[display("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    /// The server asked us to slow down (HTTP 503 or 429).
    #[display("rate limited (HTTP {status}) by {url}")]
    RateLimited { url: String, status: u16 },
    /// The URL could not be parsed.
    #[display("invalid URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
    /// The HTTP client could not be constructed.
    #[display("could not construct HTTP client")]
    Client,
}

impl ErrorKind {
    /// The HTTP status code, when the server got as far as answering.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::RateLimited { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for failures that leave the node empty for this run
    /// only; re-running the crawl is the retry mechanism.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Status { .. } | Self::RateLimited { .. })
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::RateLimited { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorKind::Transport { url: "u".into() }, None, true)]
    #[case(ErrorKind::Status { url: "u".into(), status: 404 }, Some(404), true)]
    #[case(ErrorKind::RateLimited { url: "u".into(), status: 503 }, Some(503), true)]
    #[case(ErrorKind::InvalidUrl("::".into()), None, false)]
    #[case(ErrorKind::Client, None, false)]
    fn test_classification(#[case] kind: ErrorKind, #[case] status: Option<u16>, #[case] transient: bool) {
        assert_eq!(kind.status(), status);
        assert_eq!(kind.is_transient(), transient);
    }
}
