//! HTML Structure Parser — a thin, query-oriented wrapper over `scraper::Html`.
//!
//! Parsing never fails: html5ever recovers from unterminated tags, missing
//! closing tags and stray markup, so every input yields a best-effort tree.
//! Each call owns its tree; nothing here is shared between requests.

use scraper::{ElementRef, Html, Selector};

/// Elements whose text content is never rendered to the reader.
const NON_VISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// A parsed HTML document or fragment.
pub struct Page {
    tree: Html,
}

impl Page {
    /// Parses a full HTML document.
    pub fn parse(html: &str) -> Self {
        Self {
            tree: Html::parse_document(html),
        }
    }

    /// Parses an HTML fragment (e.g. a readability summary block).
    pub fn parse_fragment(html: &str) -> Self {
        Self {
            tree: Html::parse_fragment(html),
        }
    }

    /// All visible text nodes, trimmed, non-empty, joined with `separator`.
    pub fn text(&self, separator: &str) -> String {
        visible_text(self.tree.root_element(), separator)
    }

    /// Elements matching a CSS selector, in document order.
    /// An unparseable selector matches nothing.
    pub fn select<'a>(&'a self, css: &str) -> Vec<ElementRef<'a>> {
        match Selector::parse(css) {
            Ok(selector) => self.tree.select(&selector).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Raw text bodies of every `<script type="...">` with the given type.
    pub fn scripts_of_type(&self, script_type: &str) -> Vec<String> {
        self.select("script")
            .into_iter()
            .filter(|el| {
                el.value()
                    .attr("type")
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case(script_type))
            })
            .map(|el| el.text().collect::<String>())
            .collect()
    }

    /// `content` of the first `<meta property="...">` carrying a non-blank value.
    pub fn meta_property(&self, property: &str) -> Option<String> {
        self.select("meta")
            .into_iter()
            .filter(|el| el.value().attr("property") == Some(property))
            .filter_map(|el| el.value().attr("content"))
            .find(|content| !content.trim().is_empty())
            .map(str::to_string)
    }

    /// Nesting depth of the deepest node, counting the root element as 1.
    /// Measured with an explicit stack so hostile nesting cannot overflow it.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(*self.tree.root_element(), 1usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children().map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// Text of the document `<title>` element, if present.
    pub fn title(&self) -> Option<String> {
        self.select("title")
            .into_iter()
            .next()
            .map(|el| el.text().collect::<String>())
    }
}

/// Visible text under `root`: text nodes outside script/style/etc., each
/// trimmed, empties dropped, joined with `separator`.
///
/// One pre-order pass with an explicit stack; hidden subtrees are pruned
/// on entry, so cost is linear in the subtree size at any nesting depth.
pub fn visible_text(root: ElementRef<'_>, separator: &str) -> String {
    if is_hidden(root) {
        return String::new();
    }

    let mut parts = Vec::new();
    let mut stack = vec![*root];
    while let Some(node) = stack.pop() {
        if let Some(text) = node.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
            continue;
        }
        if ElementRef::wrap(node).is_some_and(is_hidden) {
            continue;
        }
        let children: Vec<_> = node.children().collect();
        stack.extend(children.into_iter().rev());
    }
    parts.join(separator)
}

fn is_hidden(el: ElementRef<'_>) -> bool {
    NON_VISIBLE_TAGS.contains(&el.value().name())
}

/// Collapses every whitespace run (newlines included) to a single space and trims.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
