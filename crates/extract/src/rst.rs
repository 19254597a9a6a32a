//! reStructuredText rendering.
//!
//! Documents are a sequence of fragments separated by a single blank line
//! and terminated by a newline.

use crate::Block;

const INDENT: &str = "   ";

#[derive(Debug, Default)]
struct Document {
    fragments: Vec<String>,
}
impl Document {
    fn push(&mut self, fragment: impl Into<String>) -> &mut Self {
        let fragment = fragment.into();
        if !fragment.is_empty() {
            self.fragments.push(fragment);
        }
        self
    }

    fn finish(self) -> String {
        let mut text = self.fragments.join("\n\n");
        text.push('\n');
        text
    }
}

/// Title over an underline of matching length.
pub(crate) fn banner(title: &str, underline: char) -> String {
    let line: String = std::iter::repeat_n(underline, title.chars().count()).collect();
    format!("{title}\n{line}")
}

pub(crate) fn anchor(slug: &str) -> String {
    format!(".. _{slug}:")
}

pub(crate) fn indent(text: &str) -> String {
    format!("{INDENT}{text}")
}

pub(crate) fn figure(path: &str, caption: Option<&str>) -> String {
    let mut figure = format!(".. figure:: {path}\n{INDENT}:figwidth: 100 %");
    if let Some(caption) = caption {
        figure.push_str("\n\n");
        figure.push_str(&indent(caption));
    }
    figure
}

fn toctree<S: AsRef<str>>(children: impl IntoIterator<Item = S>) -> String {
    let mut tree = String::from(".. toctree::");
    let mut first = true;
    for child in children {
        tree.push_str(if first { "\n\n" } else { "\n" });
        tree.push_str(INDENT);
        tree.push_str(child.as_ref());
        tree.push_str("/index");
        first = false;
    }
    tree
}

/// Renders a container index: optional anchor, `=` title banner, and one
/// toctree entry per child slug, in order.
///
/// ```rust
/// use folio_extract::render_index;
/// assert_eq!(
///     render_index(Some("Work"), "Work", ["Careers", "Calling"]),
///     ".. _Work:\n\nWork\n====\n\n.. toctree::\n\n   Careers/index\n   Calling/index\n",
/// );
/// ```
pub fn render_index<S: AsRef<str>>(
    anchor_slug: Option<&str>,
    title: &str,
    children: impl IntoIterator<Item = S>,
) -> String {
    let mut document = Document::default();
    if let Some(slug) = anchor_slug {
        document.push(anchor(slug));
    }
    document.push(banner(title, '='));
    document.push(toctree(children));
    document.finish()
}

/// Renders a chapter: anchor, `=` title banner, then every block.
pub fn render_chapter(title: &str, slug: &str, blocks: &[Block], figure_path: impl Fn(&str) -> String) -> String {
    let mut document = Document::default();
    document.push(anchor(slug));
    document.push(banner(title, '='));
    for block in blocks {
        document.push(block.fragment(&figure_path));
    }
    document.finish()
}
