//! Path validation for artifact storage.
//!
//! Every artifact path is derived from titles scraped off a remote site, so
//! each one is checked before it touches the filesystem.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a storage path and returns it in normalized, relative form.
///
/// Paths may never climb above the storage root. `..` components are
/// resolved against the components seen so far, current-directory and
/// root components are dropped, and NUL bytes are rejected outright.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use folio_storage::validate_path;
/// assert!(validate_path("book/Relationships/index.rst").is_ok());
/// assert!(validate_path("book/../images/abc.jpg").is_ok());
/// assert!(validate_path("../outside.rst").is_err());
/// assert!(validate_path("book/../../outside.rst").is_err());
/// assert_eq!(
///     validate_path("/book//Work/./index.rst").unwrap(),
///     Path::new("book/Work/index.rst")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let mut components = Vec::new();
    for component in original.components() {
        match component {
            Component::Normal(segment) => {
                // Passes through Path::components() on Unix, but truncates
                // the path in C-based syscalls.
                if segment.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
                }
                components.push(segment);
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(original.to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
                }
            },
        }
    }
    if components.is_empty() {
        exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
    }
    Ok(components.into_iter().collect())
}
