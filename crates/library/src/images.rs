use crate::IMAGES_DIR;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use folio_fetch::{Fetcher, FetcherHandle};
use folio_storage::{BackendHandle, StorageBackend};
use std::path::{Path, PathBuf};
use tracing::instrument;
use url::Url;

/// File referenced in place of an image that could not be stored.
pub const PLACEHOLDER: &str = "missing.png";
const DEFAULT_EXTENSION: &str = "jpg";
const MAX_EXTENSION_CHARS: usize = 5;

/// Content-addressed image store shared by every chapter.
///
/// An image is named after the hash of its source URL, so the same URL
/// always maps to the same file and is downloaded at most once, across
/// chapters and across runs.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}
impl Default for ImageStore {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(IMAGES_DIR),
        }
    }
}
impl ImageStore {
    /// `<blake3 of url>.<ext>`, with the extension taken from the URL path.
    pub fn file_name(url: &str) -> String {
        format!("{}.{}", blake3::hash(url.as_bytes()).to_hex(), extension(url))
    }

    /// Path of an image file relative to `depth` directories below the
    /// storage root.
    pub fn reference(&self, file_name: &str, depth: usize) -> String {
        format!("{}{}/{file_name}", "../".repeat(depth), self.dir.display())
    }

    /// Makes sure the image behind `url` is stored and returns its file
    /// name. Never fails: an image that cannot be stored resolves to
    /// [`PLACEHOLDER`].
    #[instrument(skip(self, fetcher, backend))]
    pub async fn resolve(&self, fetcher: &FetcherHandle, backend: &BackendHandle, url: &str) -> String {
        let file_name = Self::file_name(url);
        match self.store(fetcher, backend, url, &self.dir.join(&file_name)).await {
            Ok(()) => file_name,
            Err(e) => {
                tracing::warn!(error = ?e, "image unavailable, using placeholder");
                PLACEHOLDER.to_string()
            },
        }
    }

    async fn store(&self, fetcher: &FetcherHandle, backend: &BackendHandle, url: &str, path: &Path) -> Result<()> {
        if backend.exists(path).await.or_raise(|| ErrorKind::Storage(path.to_path_buf()))? {
            tracing::debug!(path = %path.display(), "image already stored");
            return Ok(());
        }
        let bytes = fetcher.binary(url).await.or_raise(|| ErrorKind::Fetch { url: url.to_string() })?;
        backend.write(path, &bytes).await.or_raise(|| ErrorKind::Storage(path.to_path_buf()))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "image stored");
        Ok(())
    }
}

fn extension(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|url| url.path_segments()?.last().map(str::to_string))
        .and_then(|segment| segment.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()))
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= MAX_EXTENSION_CHARS && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}
