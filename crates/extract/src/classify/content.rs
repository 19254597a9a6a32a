use scraper::ElementRef;
use url::Url;

use super::inline::{emphasized_text, plain_text};
use crate::consts::{self, PARAGRAPH_TAG, SHARE_MARKER};

/// One top-level element of a chapter body, reduced to the facts the
/// classifier looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ContentBlock {
    /// Flattened, whitespace-collapsed inner text.
    pub(crate) text: String,
    /// First image with an absolute source.
    pub(crate) image: Option<String>,
    /// Bold-normalised text, present only for paragraph-equivalent markup.
    pub(crate) paragraph: Option<String>,
}
impl ContentBlock {
    pub(crate) fn from_element(element: ElementRef<'_>) -> Self {
        let is_paragraph = element.value().name() == PARAGRAPH_TAG
            || element.select(&consts::PARAGRAPH_SELECTOR).next().is_some();
        Self {
            text: plain_text(element),
            image: image_source(element),
            paragraph: is_paragraph.then(|| emphasized_text(element)),
        }
    }

    /// Starts with a dash followed by whitespace.
    pub(crate) fn has_list_marker(&self) -> bool {
        consts::LIST_MARKER_REGEX.is_match(&self.text)
    }

    /// Neither an image nor any letter: spacers, rules, empty wrappers.
    fn is_blank(&self) -> bool {
        self.image.is_none() && !self.text.chars().any(char::is_alphabetic)
    }
}

/// Reduces the element children of a chapter body to the block sequence.
///
/// Text nodes between elements are ignored, the share widget ends the
/// article, and blank elements are dropped.
pub(crate) fn sequence(body: ElementRef<'_>) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    for element in body.children().filter_map(ElementRef::wrap) {
        if is_share_marker(element) {
            break;
        }
        let block = ContentBlock::from_element(element);
        if !block.is_blank() {
            blocks.push(block);
        }
    }
    blocks
}

fn is_share_marker(element: ElementRef<'_>) -> bool {
    element.value().attr("class").is_some_and(|class| class.contains(SHARE_MARKER))
        || element.select(&consts::SHARE_SELECTOR).next().is_some()
}

fn image_source(element: ElementRef<'_>) -> Option<String> {
    let own = (element.value().name() == "img").then_some(element);
    own.into_iter()
        .chain(element.select(&consts::IMAGE_SELECTOR))
        .filter_map(|img| img.value().attr("src"))
        .find(|src| is_absolute(src))
        .map(|src| src.trim().to_string())
}

fn is_absolute(src: &str) -> bool {
    Url::parse(src.trim()).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use scraper::{Html, Selector};

    fn body_sequence(inner: &str) -> Vec<ContentBlock> {
        let document = Html::parse_fragment(&format!("<div class=\"old-wrapper\">{inner}</div>"));
        let selector = Selector::parse(".old-wrapper").unwrap();
        sequence(document.select(&selector).next().unwrap())
    }

    #[test]
    fn test_sequence_skips_text_and_blank_nodes() {
        let blocks = body_sequence("stray text<p>First</p><p> &nbsp; </p><hr><div>—</div><p>Second</p>");
        let texts: Vec<&str> = blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["First", "Second"]);
    }

    #[rstest]
    #[case("<div class=\"addtoany_share_save_container\"><a>Share</a></div>")]
    #[case("<div class=\"wrap\"><span class=\"a2a addtoany_list\">Share</span></div>")]
    fn test_sequence_stops_at_share_widget(#[case] marker: &str) {
        let blocks = body_sequence(&format!("<p>Kept</p>{marker}<p>Never seen</p>"));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Kept");
    }

    #[rstest]
    #[case("<figure><img src=\"https://example.com/a.jpg\"></figure>", Some("https://example.com/a.jpg"))]
    #[case("<img src=\"http://example.com/b.png\">", Some("http://example.com/b.png"))]
    #[case("<figure><img src=\"/relative.jpg\"><img src=\"https://example.com/c.jpg\"></figure>", Some("https://example.com/c.jpg"))]
    #[case("<figure><img src=\"/relative.jpg\"><figcaption>Caption</figcaption></figure>", None)]
    #[case("<figure><img src=\"data:image/png;base64,AAAA\">Alt</figure>", None)]
    fn test_image_source(#[case] html: &str, #[case] expected: Option<&str>) {
        let blocks = body_sequence(html);
        assert_eq!(blocks.first().and_then(|b| b.image.as_deref()), expected);
    }

    #[rstest]
    #[case("<p>Para</p>", true)]
    #[case("<div><p>Wrapped</p></div>", true)]
    #[case("<div>Wrapper only</div>", false)]
    #[case("<h3>Title</h3>", false)]
    fn test_paragraph_equivalent(#[case] html: &str, #[case] paragraph: bool) {
        let blocks = body_sequence(html);
        assert_eq!(blocks[0].paragraph.is_some(), paragraph);
    }

    #[rstest]
    #[case("- one", true)]
    #[case("– en dash", true)]
    #[case("— em dash", true)]
    #[case("-no space", false)]
    #[case("Plain", false)]
    fn test_list_marker(#[case] text: &str, #[case] expected: bool) {
        let block = ContentBlock { text: text.to_string(), ..Default::default() };
        assert_eq!(block.has_list_marker(), expected);
    }
}
