//! The crawl tree and the walker that drives it.
//!
//! A [`Book`] owns its [`Part`]s, each part owns its [`Section`]s, and each
//! section owns its [`Chapter`]s. Every node persists one artifact, and the
//! presence of that artifact is the only record that the node is done: a
//! rerun skips finished chapters without fetching them and rebuilds the
//! container indexes from cached pages.
//!
//! Storage layout, relative to the backend root:
//!
//! ```text
//! book/index.rst
//! book/<part>/index.rst
//! book/<part>/<section>/index.rst
//! book/<part>/<section>/<chapter>/index.rst
//! images/<blake3 of url>.<ext>
//! pages/book.html
//! pages/<part>.html
//! ```

pub mod error;
mod images;
mod nodes;
mod walker;

pub use crate::images::{ImageStore, PLACEHOLDER};
pub use crate::nodes::{Book, Chapter, Container, Node, Part, Section};
pub use crate::walker::{ChapterOutcome, CrawlEvent, CrawlSummary, crawl};
use folio_fetch::FetcherHandle;
use folio_storage::BackendHandle;

pub const BOOK_TITLE: &str = "The Book of Life";
pub(crate) const BOOK_DIR: &str = "book";
pub(crate) const IMAGES_DIR: &str = "images";
pub(crate) const PAGES_DIR: &str = "pages";
pub(crate) const INDEX_FILE: &str = "index.rst";

/// Everything a node needs to load and write itself.
pub struct Context {
    pub fetcher: FetcherHandle,
    pub backend: BackendHandle,
    /// Landing page of the publication.
    pub root_url: String,
    pub images: ImageStore,
}
impl Context {
    pub fn new(fetcher: FetcherHandle, backend: BackendHandle, root_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            backend,
            root_url: root_url.into(),
            images: ImageStore::default(),
        }
    }
}
