//! Everything the crawl reads out of publication markup.
//!
//! - [`book_parts`] and [`part_sections`] read the outline of the book.
//! - [`chapter_blocks`] classifies the body of a chapter page into [`Block`]s.
//! - [`render_chapter`] and [`render_index`] turn those into
//!   reStructuredText documents.
//!
//! All results are owned values: the parsed document never outlives the
//! function that parsed it.

mod classify;
mod consts;
pub mod error;
mod outline;
mod rst;
mod slug;

pub use crate::classify::Block;
pub use crate::outline::{ChapterLink, PartLink, SectionOutline, book_parts, chapter_blocks, part_sections, part_url};
pub use crate::rst::{render_chapter, render_index};
pub use crate::slug::{clean_title, dedup_by_slug, slugify};
