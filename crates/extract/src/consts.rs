use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

/// Class fragment of the share-button widget that closes every article body.
pub(crate) const SHARE_MARKER: &str = "addtoany";
pub(crate) const PARAGRAPH_TAG: &str = "p";
pub(crate) const EMPHASIS_TAGS: [&str; 3] = ["em", "strong", "b"];
pub(crate) const LINE_BREAK_TAG: &str = "br";

// Book page: one rollover entry per part in the main navigation. Entries
// without the hover handler are decorative duplicates.
selector!(PART_LINK_SELECTOR, ".nav-main__sub-rollover[onmouseover]");
// Part page.
selector!(SECTION_SELECTOR, "section");
selector!(SECTION_TITLE_SELECTOR, "div");
selector!(CHAPTER_ITEM_SELECTOR, "li");
selector!(CHAPTER_TITLE_SELECTOR, ".title");
selector!(LINK_SELECTOR, "a[href]");
// Chapter page.
selector!(CHAPTER_BODY_SELECTOR, ".old-wrapper");
selector!(SHARE_SELECTOR, "[class*=\"addtoany\"]");
selector!(IMAGE_SELECTOR, "img[src]");
selector!(PARAGRAPH_SELECTOR, "p");

regex!(WHITESPACE_REGEX, r"\s+");
regex!(NON_WORD_REGEX, r"\W");
regex!(LIST_MARKER_REGEX, r"^[-–—]\s");
regex!(DECIMAL_HEADING_REGEX, r"^\d+\.\s*([^\d\s].*)$");
regex!(
    ROMAN_HEADING_REGEX,
    r"(?i)^\(?(m{0,3}(?:cm|cd|d?c{0,3})(?:xc|xl|l?x{0,3})(?:ix|iv|v?i{0,3}))[.)]\s+(\S.*)$"
);
regex!(BULLET_HEADING_REGEX, r#"^[^\w\s"'“”‘’(\-–—]\s*(\w.*)$"#);
