//! The four levels of the crawl tree.
//!
//! Each node owns its children outright; nothing is shared between
//! siblings. Container nodes ([`Book`], [`Part`], [`Section`]) build their
//! children while loading and regenerate their index on every run.
//! [`Chapter`]s are leaves whose document is written exactly once.

mod book;
mod chapter;
mod part;
mod section;

pub use self::book::Book;
pub use self::chapter::Chapter;
pub use self::part::Part;
pub use self::section::Section;
use crate::error::{ErrorKind, Result};
use crate::{Context, INDEX_FILE};
use exn::ResultExt;
use folio_extract::error::{ErrorKind as ExtractErrorKind, Result as ExtractResult};
use folio_fetch::Fetcher;
use folio_storage::StorageBackend;
use std::path::{Path, PathBuf};

/// Capabilities shared by every level of the tree.
pub trait Node {
    /// Display title, trimmed.
    fn title(&self) -> &str;

    /// Directory and anchor name, derived from the title.
    fn slug(&self) -> &str;

    /// Directory holding this node's artifact, relative to the storage root.
    fn dir(&self) -> &Path;

    /// The node's artifact: an index for containers, the document for chapters.
    fn index_path(&self) -> PathBuf {
        self.dir().join(INDEX_FILE)
    }
}

/// A node whose artifact is an index of its children.
pub trait Container: Node {
    /// Cross-reference anchor placed above the title, if any.
    fn anchor(&self) -> Option<&str> {
        Some(self.slug())
    }

    /// Slugs of the current children, in traversal order.
    fn child_slugs(&self) -> Vec<&str>;

    fn render_index(&self) -> String {
        folio_extract::render_index(self.anchor(), self.title(), self.child_slugs())
    }
}

/// Regenerates the index of a container from its current children.
pub(crate) async fn write_index(ctx: &Context, node: &impl Container) -> Result<PathBuf> {
    let path = node.index_path();
    ctx.backend
        .write(&path, node.render_index().as_bytes())
        .await
        .or_raise(|| ErrorKind::Storage(path.clone()))?;
    tracing::debug!(path = %path.display(), children = node.child_slugs().len(), "index written");
    Ok(path)
}

/// Parses a container page, preferring the cached copy at `cache_path`.
///
/// The network copy is cached only once it has parsed, so a cached page is
/// always one that produced a structure.
pub(crate) async fn load_page<T>(
    ctx: &Context,
    cache_path: &Path,
    url: &str,
    parse: impl Fn(&str) -> ExtractResult<T>,
) -> Result<T> {
    let cached = ctx.backend.exists(cache_path).await.or_raise(|| ErrorKind::Storage(cache_path.to_path_buf()))?;
    if cached {
        let bytes = ctx.backend.read(cache_path).await.or_raise(|| ErrorKind::Storage(cache_path.to_path_buf()))?;
        let html = String::from_utf8_lossy(&bytes);
        match parse(&html) {
            Ok(parsed) => {
                tracing::debug!(path = %cache_path.display(), "using cached page");
                return Ok(parsed);
            },
            Err(e) => tracing::warn!(path = %cache_path.display(), error = ?e, "cached page no longer parses"),
        }
    }
    let page = ctx.fetcher.page(url).await.or_raise(|| ErrorKind::Fetch { url: url.to_string() })?;
    let parsed = parse(&page.html);
    let landmark = parsed.as_ref().err().map(|e| landmark_of(e)).unwrap_or_default();
    let parsed = parsed.or_raise(|| ErrorKind::StructuralMismatch {
        landmark,
        url: url.to_string(),
    })?;
    ctx.backend
        .write(cache_path, page.html.as_bytes())
        .await
        .or_raise(|| ErrorKind::Storage(cache_path.to_path_buf()))?;
    Ok(parsed)
}

pub(crate) fn landmark_of(error: &ExtractErrorKind) -> &'static str {
    match error {
        ExtractErrorKind::MissingLandmark(landmark) => *landmark,
        ExtractErrorKind::InvalidUrl(_) => "resolvable link",
    }
}
