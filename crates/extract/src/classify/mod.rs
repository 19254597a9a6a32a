//! Chapter body classification.
//!
//! The article markup is a flat run of generic elements with no semantic
//! tags, so the role of each one is inferred from its own text shape, the
//! presence of an image, and its immediate neighbours. Roles are assigned in
//! a fixed precedence order and each block gets exactly one:
//!
//! 1. image, 2. caption, 3. heading, 4. list item, 5. paragraph.
//!
//! A block is classified from a window of three: the previous block together
//! with the role it already received, the current block, and the raw text of
//! the next block.

mod content;
mod inline;

pub(crate) use self::content::{ContentBlock, sequence};
use crate::{consts, rst};

/// Headings are short; anything longer is prose that happens to start with
/// a number.
const MAX_HEADING_CHARS: usize = 70;
/// Captions are strictly shorter than this.
const MAX_CAPTION_CHARS: usize = 100;

/// A classified block of chapter content, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// An image, with the caption text carried by the image element itself.
    Figure { source: String, caption: Option<String> },
    /// Short text attached to the figure before it.
    Caption(String),
    /// Sub-section title with its numbering stripped.
    Heading(String),
    /// A dash-marked line, kept verbatim.
    ListItem(String),
    /// Normalised paragraph text.
    Paragraph(String),
}
impl Block {
    /// Absolute URL of the image, for figures.
    pub fn image_source(&self) -> Option<&str> {
        match self {
            Self::Figure { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Renders the reStructuredText fragment of this block. `figure_path`
    /// maps an image source to the path the document should reference.
    pub fn fragment(&self, figure_path: impl Fn(&str) -> String) -> String {
        match self {
            Self::Figure { source, caption } => rst::figure(&figure_path(source), caption.as_deref()),
            Self::Caption(text) => rst::indent(text),
            Self::Heading(title) => rst::banner(title, '-'),
            Self::ListItem(text) | Self::Paragraph(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Image,
    Caption,
    Heading,
    ListItem,
    Paragraph,
    /// Structural wrapper markup with no content of its own.
    Suppressed,
}

/// Classifies a block sequence and drops suppressed blocks.
pub(crate) fn classify(blocks: &[ContentBlock]) -> Vec<Block> {
    let mut classified = Vec::with_capacity(blocks.len());
    let mut previous = None;
    for (index, current) in blocks.iter().enumerate() {
        let role = role(previous, current, blocks.get(index + 1));
        classified.extend(render(current, role));
        previous = Some((current, role));
    }
    classified
}

/// Assigns the role of `current`. The first matching rule wins.
pub(crate) fn role(
    previous: Option<(&ContentBlock, Role)>,
    current: &ContentBlock,
    next: Option<&ContentBlock>,
) -> Role {
    if current.image.is_some() {
        return Role::Image;
    }
    let list_item = current.has_list_marker()
        && (matches!(previous, Some((_, Role::ListItem))) || next.is_some_and(ContentBlock::has_list_marker));
    let heading = !list_item && is_heading(&current.text);
    let follows_bare_image = matches!(previous, Some((block, Role::Image)) if block.text.is_empty());
    if follows_bare_image
        && !list_item
        && !heading
        && current.text.chars().count() < MAX_CAPTION_CHARS
        && current.text.chars().next().is_some_and(char::is_alphabetic)
    {
        return Role::Caption;
    }
    if heading {
        return Role::Heading;
    }
    if list_item {
        return Role::ListItem;
    }
    match current.paragraph {
        Some(_) => Role::Paragraph,
        None => Role::Suppressed,
    }
}

fn render(block: &ContentBlock, role: Role) -> Option<Block> {
    match role {
        Role::Image => Some(Block::Figure {
            source: block.image.clone()?,
            caption: (!block.text.is_empty()).then(|| block.text.clone()),
        }),
        Role::Caption => Some(Block::Caption(block.text.clone())),
        Role::Heading => heading_title(&block.text).map(|title| Block::Heading(title.to_string())),
        Role::ListItem => Some(Block::ListItem(block.text.clone())),
        Role::Paragraph => block.paragraph.clone().filter(|text| !text.is_empty()).map(Block::Paragraph),
        Role::Suppressed => None,
    }
}

fn is_heading(text: &str) -> bool {
    text.chars().count() <= MAX_HEADING_CHARS && heading_title(text).is_some()
}

/// The title left after stripping a decimal, roman or bullet numbering
/// prefix, if the text has one.
fn heading_title(text: &str) -> Option<&str> {
    let title = if let Some(captures) = consts::DECIMAL_HEADING_REGEX.captures(text) {
        captures.get(1)
    } else if let Some(captures) = consts::ROMAN_HEADING_REGEX.captures(text)
        && captures.get(1).is_some_and(|numeral| !numeral.is_empty())
    {
        captures.get(2)
    } else {
        consts::BULLET_HEADING_REGEX.captures(text).and_then(|captures| captures.get(1))
    };
    Some(title?.as_str().trim()).filter(|title| !title.is_empty())
}
