//! Titles and the slugs derived from them.
//!
//! A slug is used as a directory name, a cross-reference anchor and a
//! toctree entry at the same time, so every one of those places must derive
//! it through [`slugify`].

use std::collections::HashSet;

use crate::consts;

/// Collapses whitespace runs to single spaces and trims the result.
///
/// ```rust
/// use folio_extract::clean_title;
/// assert_eq!(clean_title("\n   Self\t Knowledge  "), "Self Knowledge");
/// ```
pub fn clean_title(raw: &str) -> String {
    consts::WHITESPACE_REGEX.replace_all(raw.trim(), " ").into_owned()
}

/// Derives the slug of a title by stripping every non-word character.
///
/// ```rust
/// use folio_extract::slugify;
/// assert_eq!(slugify(" Self-Knowledge "), "SelfKnowledge");
/// assert_eq!(slugify("What's Wrong?"), "WhatsWrong");
/// ```
pub fn slugify(title: &str) -> String {
    consts::NON_WORD_REGEX.replace_all(title.trim(), "").into_owned()
}

/// Keeps the first item of every slug, in order, and drops items whose slug
/// is empty.
pub fn dedup_by_slug<T>(items: &mut Vec<T>, slug: impl Fn(&T) -> &str) {
    let mut seen = HashSet::new();
    items.retain(|item| {
        let slug = slug(item);
        if slug.is_empty() {
            tracing::debug!("dropping entry without a usable slug");
            return false;
        }
        if !seen.insert(slug.to_string()) {
            tracing::debug!(slug, "dropping entry with duplicate slug");
            return false;
        }
        true
    });
}
