//! Publication structure: the part list on the book page, the sections and
//! chapter links on a part page, and the body of a chapter page.

use exn::{OptionExt, ResultExt};
use scraper::{ElementRef, Html};
use tracing::instrument;
use url::Url;

use crate::classify::{self, Block};
use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::slug::{clean_title, dedup_by_slug, slugify};

/// A part listed in the book navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartLink {
    pub title: String,
    pub slug: String,
    /// Index page of the part.
    pub url: String,
}

/// A section carved out of a part page, with the chapters it lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionOutline {
    pub title: String,
    pub slug: String,
    pub chapters: Vec<ChapterLink>,
}

/// A chapter listed in a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterLink {
    pub title: String,
    pub slug: String,
    /// Absolute URL of the chapter page.
    pub url: String,
}

/// Lists the parts of the book, in navigation order.
///
/// # Errors
///
/// Fails if `root_url` is not a URL, or if the page lists no parts at all.
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn book_parts(html: &str, root_url: &str) -> Result<Vec<PartLink>> {
    let root = Url::parse(root_url).or_raise(|| ErrorKind::InvalidUrl(root_url.to_string()))?;
    let document = Html::parse_document(html);
    let mut parts = Vec::new();
    for element in document.select(&consts::PART_LINK_SELECTOR) {
        let title = clean_title(&element.text().collect::<String>());
        if title.is_empty() {
            tracing::debug!("skipping untitled part");
            continue;
        }
        parts.push(PartLink {
            url: part_url(&root, &title)?,
            slug: slugify(&title),
            title,
        });
    }
    dedup_by_slug(&mut parts, |part| part.slug.as_str());
    if parts.is_empty() {
        exn::bail!(ErrorKind::MissingLandmark("part navigation"));
    }
    Ok(parts)
}

/// `<root>/category/<title>/?index`
///
/// ```rust
/// use folio_extract::part_url;
/// use url::Url;
/// let root = Url::parse("https://theschooloflife.com/thebookoflife").unwrap();
/// assert_eq!(
///     part_url(&root, "Self Knowledge").unwrap(),
///     "https://theschooloflife.com/thebookoflife/category/Self%20Knowledge/?index",
/// );
/// ```
pub fn part_url(root: &Url, title: &str) -> Result<String> {
    let mut url = root.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|()| ErrorKind::InvalidUrl(root.to_string()))?;
        segments.pop_if_empty().push("category").push(title).push("");
    }
    url.set_query(Some("index"));
    Ok(url.to_string())
}

/// Lists the sections of a part page and the chapters each one links to.
/// Chapter links are resolved against `page_url`.
///
/// # Errors
///
/// Fails if `page_url` is not a URL, or if the page has no titled section.
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn part_sections(html: &str, page_url: &str) -> Result<Vec<SectionOutline>> {
    let base = Url::parse(page_url).or_raise(|| ErrorKind::InvalidUrl(page_url.to_string()))?;
    let document = Html::parse_document(html);
    let mut sections = Vec::new();
    for section in document.select(&consts::SECTION_SELECTOR) {
        let Some(heading) = section.select(&consts::SECTION_TITLE_SELECTOR).next() else {
            tracing::debug!("skipping section without a title");
            continue;
        };
        let title = clean_title(&heading.text().collect::<String>());
        let mut chapters: Vec<ChapterLink> =
            section.select(&consts::CHAPTER_ITEM_SELECTOR).filter_map(|item| chapter_link(item, &base)).collect();
        dedup_by_slug(&mut chapters, |chapter| chapter.slug.as_str());
        sections.push(SectionOutline {
            slug: slugify(&title),
            title,
            chapters,
        });
    }
    dedup_by_slug(&mut sections, |section| section.slug.as_str());
    if sections.is_empty() {
        exn::bail!(ErrorKind::MissingLandmark("section"));
    }
    Ok(sections)
}

fn chapter_link(item: ElementRef<'_>, base: &Url) -> Option<ChapterLink> {
    let title = item
        .select(&consts::CHAPTER_TITLE_SELECTOR)
        .next()
        .map(|element| clean_title(&element.text().collect::<String>()))
        .filter(|title| !title.is_empty());
    let href = item.select(&consts::LINK_SELECTOR).next().and_then(|anchor| anchor.value().attr("href"));
    let (Some(title), Some(href)) = (title, href) else {
        tracing::debug!("skipping chapter entry without a title or link");
        return None;
    };
    let Ok(url) = base.join(href.trim()) else {
        tracing::debug!(href, "skipping chapter entry with an unresolvable link");
        return None;
    };
    Some(ChapterLink {
        slug: slugify(&title),
        title,
        url: url.to_string(),
    })
}

/// Classifies the article body of a chapter page.
///
/// An empty result means the body exists but carries no content.
///
/// # Errors
///
/// Fails if the page has no article body.
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn chapter_blocks(html: &str) -> Result<Vec<Block>> {
    let document = Html::parse_document(html);
    let body = document
        .select(&consts::CHAPTER_BODY_SELECTOR)
        .next()
        .ok_or_raise(|| ErrorKind::MissingLandmark("chapter body"))?;
    Ok(classify::classify(&classify::sequence(body)))
}
