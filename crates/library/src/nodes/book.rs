use super::{Container, Node, Part, load_page};
use crate::error::Result;
use crate::{BOOK_DIR, BOOK_TITLE, Context, PAGES_DIR};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Root of the tree. Its page lists the parts.
#[derive(Debug)]
pub struct Book {
    title: String,
    url: String,
    dir: PathBuf,
    pub parts: Vec<Part>,
}
impl Book {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            title: BOOK_TITLE.to_string(),
            url: url.into(),
            dir: PathBuf::from(BOOK_DIR),
            parts: Vec::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Builds the part list from the book page.
    ///
    /// # Errors
    ///
    /// Any failure is fatal to the crawl: without the book page there is
    /// nothing to walk.
    #[instrument(skip(self, ctx), fields(url = %self.url))]
    pub async fn load(&mut self, ctx: &Context) -> Result<()> {
        let cache_path = Path::new(PAGES_DIR).join("book.html");
        let links = load_page(ctx, &cache_path, &self.url, |html| folio_extract::book_parts(html, &self.url)).await?;
        self.parts = links.into_iter().map(|link| Part::new(link, &self.dir)).collect();
        tracing::info!(parts = self.parts.len(), "book loaded");
        Ok(())
    }

    /// Number of chapters across every part and section.
    pub fn chapter_count(&self) -> usize {
        self.parts.iter().flat_map(|part| &part.sections).map(|section| section.chapters.len()).sum()
    }
}
impl Node for Book {
    fn title(&self) -> &str {
        &self.title
    }

    fn slug(&self) -> &str {
        BOOK_DIR
    }

    fn dir(&self) -> &Path {
        &self.dir
    }
}
impl Container for Book {
    /// The book index is the document root and needs no anchor.
    fn anchor(&self) -> Option<&str> {
        None
    }

    fn child_slugs(&self) -> Vec<&str> {
        self.parts.iter().map(Node::slug).collect()
    }
}
