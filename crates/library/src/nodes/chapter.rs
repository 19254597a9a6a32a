use super::{Node, landmark_of};
use crate::error::{ErrorKind, Result};
use crate::{Context, PLACEHOLDER};
use exn::ResultExt;
use folio_extract::{Block, ChapterLink};
use folio_fetch::Fetcher;
use folio_storage::StorageBackend;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::instrument;

const CONTENT_LANDMARK: &str = "chapter content";

/// A leaf of the tree: one article, converted to one document.
///
/// The classified body is held between [`load`](Self::load) and
/// [`write`](Self::write) only; the written document is the sole durable
/// state.
#[derive(Debug)]
pub struct Chapter {
    title: String,
    slug: String,
    url: String,
    dir: PathBuf,
    content: Option<Vec<Block>>,
}
impl Chapter {
    pub(crate) fn new(link: ChapterLink, parent: &Path) -> Self {
        Self {
            dir: parent.join(&link.slug),
            title: link.title,
            slug: link.slug,
            url: link.url,
            content: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_loaded(&self) -> bool {
        self.content.is_some()
    }

    /// Whether the document already exists, i.e. a previous run finished
    /// this chapter.
    pub async fn is_written(&self, ctx: &Context) -> Result<bool> {
        let path = self.index_path();
        ctx.backend.exists(&path).await.or_raise(|| ErrorKind::Storage(path.clone()))
    }

    /// Fetches the chapter page and classifies its body.
    ///
    /// # Errors
    ///
    /// Fails when the page cannot be fetched, has no article body, or the
    /// body has no content. The chapter is left unloaded.
    #[instrument(skip(self, ctx), fields(url = %self.url, slug = %self.slug))]
    pub async fn load(&mut self, ctx: &Context) -> Result<()> {
        let page = ctx.fetcher.page(&self.url).await.or_raise(|| ErrorKind::Fetch { url: self.url.clone() })?;
        let blocks = folio_extract::chapter_blocks(&page.html);
        let landmark = blocks.as_ref().err().map(|e| landmark_of(e)).unwrap_or_default();
        let blocks = blocks.or_raise(|| ErrorKind::StructuralMismatch {
            landmark,
            url: self.url.clone(),
        })?;
        if blocks.is_empty() {
            exn::bail!(ErrorKind::StructuralMismatch {
                landmark: CONTENT_LANDMARK,
                url: self.url.clone(),
            });
        }
        tracing::debug!(blocks = blocks.len(), "chapter classified");
        self.content = Some(blocks);
        Ok(())
    }

    /// Stores the chapter's images and writes its document, consuming the
    /// loaded content.
    #[instrument(skip(self, ctx), fields(slug = %self.slug))]
    pub async fn write(&mut self, ctx: &Context) -> Result<PathBuf> {
        let Some(blocks) = self.content.take() else {
            exn::bail!(ErrorKind::StructuralMismatch {
                landmark: CONTENT_LANDMARK,
                url: self.url.clone(),
            });
        };
        let depth = self.dir.components().count();
        let mut figures: HashMap<&str, String> = HashMap::new();
        for source in blocks.iter().filter_map(Block::image_source) {
            if !figures.contains_key(source) {
                let file_name = ctx.images.resolve(&ctx.fetcher, &ctx.backend, source).await;
                figures.insert(source, ctx.images.reference(&file_name, depth));
            }
        }
        let document = folio_extract::render_chapter(&self.title, &self.slug, &blocks, |source| {
            figures.get(source).cloned().unwrap_or_else(|| ctx.images.reference(PLACEHOLDER, depth))
        });
        let path = self.index_path();
        ctx.backend
            .write(&path, document.as_bytes())
            .await
            .or_raise(|| ErrorKind::Storage(path.clone()))?;
        Ok(path)
    }
}
impl Node for Chapter {
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
