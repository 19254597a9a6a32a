//! Inline text flattening.

use scraper::ElementRef;

use crate::consts::{self, EMPHASIS_TAGS, LINE_BREAK_TAG};

const BOLD: &str = "**";

/// Inner text of an element with line breaks as spaces and whitespace
/// collapsed.
pub(crate) fn plain_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    flatten(element, false, &mut raw);
    collapse(&raw)
}

/// Like [`plain_text`], but emphasis becomes `**bold**` markup.
///
/// Only the outermost emphasis element produces markers. Whitespace at the
/// edges of an emphasised run is moved outside the markers, emphasis with no
/// text vanishes, and two runs that touch are merged into one.
pub(crate) fn emphasized_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    flatten(element, true, &mut raw);
    collapse(&raw.replace("****", ""))
}

fn flatten(element: ElementRef<'_>, mark: bool, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            let name = child.value().name();
            if name == LINE_BREAK_TAG {
                out.push(' ');
            } else if mark && EMPHASIS_TAGS.contains(&name) {
                let mut inner = String::new();
                flatten(child, false, &mut inner);
                push_emphasis(&inner, out);
            } else {
                flatten(child, mark, out);
            }
        }
    }
}

fn push_emphasis(inner: &str, out: &mut String) {
    let core = inner.trim();
    if core.is_empty() {
        out.push_str(inner);
        return;
    }
    if inner.starts_with(char::is_whitespace) {
        out.push(' ');
    }
    out.push_str(BOLD);
    out.push_str(core);
    out.push_str(BOLD);
    if inner.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

fn collapse(raw: &str) -> String {
    consts::WHITESPACE_REGEX.replace_all(raw.trim(), " ").into_owned()
}
