use super::{Chapter, Container, Node};
use folio_extract::SectionOutline;
use std::path::{Path, PathBuf};

/// A group of chapters carved out of its part's page. Sections never fetch
/// anything themselves.
#[derive(Debug)]
pub struct Section {
    title: String,
    slug: String,
    dir: PathBuf,
    pub chapters: Vec<Chapter>,
}
impl Section {
    pub(crate) fn new(outline: SectionOutline, parent: &Path) -> Self {
        let dir = parent.join(&outline.slug);
        let chapters = outline.chapters.into_iter().map(|link| Chapter::new(link, &dir)).collect();
        Self {
            title: outline.title,
            slug: outline.slug,
            dir,
            chapters,
        }
    }
}
impl Node for Section {
    fn title(&self) -> &str {
        &self.title
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn dir(&self) -> &Path {
        &self.dir
    }
}
impl Container for Section {
    fn child_slugs(&self) -> Vec<&str> {
        self.chapters.iter().map(Node::slug).collect()
    }
}
