//! Storage backend trait and implementations.
//!
//! The crawl persists three kinds of artifact through a [`StorageBackend`]:
//! generated documents, downloaded images, and the raw container pages that
//! let a rerun rebuild the tree without touching the network. Presence of an
//! artifact is the crawl's only completion marker, so [`exists`] must never
//! report a file that was only partially written.
//!
//! [`exists`]: StorageBackend::exists

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Unified interface for storage backends.
///
/// # Path Handling
/// All paths are relative to the storage root and must be validated using
/// [`validate_path`](crate::validate_path) before use. Implementations should
/// enforce this validation.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use folio_storage::{backend::StorageBackend, error::Result};
///
/// async fn already_written(backend: &dyn StorageBackend) -> Result<bool> {
///     backend.exists(Path::new("book/Work/Ambition/index.rst")).await
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend, used for logging only.
    fn name(&self) -> &str;

    /// Check if a file exists.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Read file contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write file contents, replacing any existing file.
    ///
    /// # Notes
    /// - Implementations should create parent directories as needed.
    /// - The write must be atomic: a reader (or a later process) sees either
    ///   no file or the complete contents, never a truncated file.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()>;
}
