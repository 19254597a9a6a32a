//! Page and binary fetching.
//!
//! The crawl only ever needs two things from the network: the markup of a
//! page, and the raw bytes of an image. [`Fetcher`] is that contract;
//! [`HttpFetcher`] fulfils it over HTTP with a fixed browser identification
//! header and a pacing delay after every page request.

pub mod error;
mod http;

pub use crate::http::HttpFetcher;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub type FetcherHandle = Arc<dyn Fetcher + Send + Sync>;

/// A fetched page, before it is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// The URL that was requested.
    pub url: String,
    /// Response body, decoded as text.
    pub html: String,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the markup of a page.
    ///
    /// Any failure (network, non-success status, rate limiting) is reported
    /// as a transient [`ErrorKind`](crate::error::ErrorKind).
    async fn page(&self, url: &str) -> Result<Page>;

    /// Fetch the raw bytes behind a URL, e.g. an image.
    async fn binary(&self, url: &str) -> Result<Vec<u8>>;
}
