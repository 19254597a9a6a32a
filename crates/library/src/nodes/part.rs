use super::{Container, Node, Section, load_page};
use crate::error::Result;
use crate::{Context, PAGES_DIR};
use folio_extract::PartLink;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// A part of the book. Its page lists the sections, and each section lists
/// its chapters, so one fetch builds two levels of the tree.
#[derive(Debug)]
pub struct Part {
    title: String,
    slug: String,
    url: String,
    dir: PathBuf,
    pub sections: Vec<Section>,
}
impl Part {
    pub(crate) fn new(link: PartLink, parent: &Path) -> Self {
        Self {
            dir: parent.join(&link.slug),
            title: link.title,
            slug: link.slug,
            url: link.url,
            sections: Vec::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Builds the section list from the part page.
    ///
    /// # Errors
    ///
    /// A fetch failure is transient and leaves the part without sections; a
    /// page without sections is a structural mismatch.
    #[instrument(skip(self, ctx), fields(url = %self.url, slug = %self.slug))]
    pub async fn load(&mut self, ctx: &Context) -> Result<()> {
        let cache_path = Path::new(PAGES_DIR).join(format!("{}.html", self.slug));
        let outlines =
            load_page(ctx, &cache_path, &self.url, |html| folio_extract::part_sections(html, &self.url)).await?;
        self.sections = outlines.into_iter().map(|outline| Section::new(outline, &self.dir)).collect();
        Ok(())
    }
}
impl Node for Part {
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
impl Container for Part {
    fn child_slugs(&self) -> Vec<&str> {
        self.sections.iter().map(Node::slug).collect()
    }
}
