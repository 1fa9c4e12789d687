//! Content Extraction Engine — turns a raw job-posting page into body text.
//!
//! Strategies, in priority order:
//! 1. `readability` — Mozilla-style main-content detection (high precision).
//! 2. `general_content` — broad block/text-node sweep with boilerplate
//!    subtrees stripped (high recall).
//!
//! Each candidate is flattened to clean text before the quality gate, and the
//! first one reaching [`MIN_CONTENT_CHARS`] wins. Strategy failures never
//! escape this module; only the final gate can fail the call.

use std::io::Cursor;

use scraper::ElementRef;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::fallback::{first_accepted, Strategy};
use crate::html::{clean_text, Page};

/// Shorter output is treated as extraction noise (nav bars, cookie banners).
pub const MIN_CONTENT_CHARS: usize = 200;

/// Readability resolves relative links against a base URL; the summary text
/// does not depend on it.
const READABILITY_BASE_URL: &str = "http://localhost/";

const CONTENT_ROOTS: &[&str] = &["article", "main", "[role=\"main\"]", "body"];

const BLOCK_TAGS: &[&str] = &[
    "p", "li", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "blockquote", "td", "th", "dd", "dt",
];

const BOILERPLATE_TAGS: &[&str] = &[
    "nav", "header", "footer", "aside", "form", "button", "script", "style", "noscript",
    "template", "svg", "iframe", "head",
];

/// Matched against lowercased `class` and `id` attributes.
const BOILERPLATE_MARKERS: &[&str] = &[
    "cookie",
    "consent",
    "banner",
    "navbar",
    "breadcrumb",
    "share",
    "social",
    "newsletter",
    "sidebar",
    "related",
    "site-footer",
    "site-header",
];

/// Readability walks the DOM recursively, one frame per nesting level. Deeper
/// pages skip straight to the general sweep.
pub const MAX_READABILITY_DEPTH: usize = 512;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Could not extract sufficient content from the job posting.")]
pub struct ExtractionQualityError;

/// The raw markup and its parsed tree, shared by every strategy.
pub struct PostingPage<'a> {
    pub html: &'a str,
    pub page: &'a Page,
}

/// Extracts cleaned posting body text from raw HTML.
pub fn extract_description(html: &str) -> Result<String, ExtractionQualityError> {
    let page = Page::parse(html);
    extract_from_page(&PostingPage { html, page: &page })
}

/// Same as [`extract_description`] for a page the caller has already parsed.
pub fn extract_from_page(posting: &PostingPage<'_>) -> Result<String, ExtractionQualityError> {
    let strategies: [Strategy<PostingPage<'_>, String>; 2] = [
        Strategy::new("readability", readability_summary),
        Strategy::new("general_content", general_content),
    ];
    run_strategies(posting, &strategies)
}

fn run_strategies<'a>(
    posting: &PostingPage<'a>,
    strategies: &[Strategy<PostingPage<'a>, String>],
) -> Result<String, ExtractionQualityError> {
    match first_accepted(posting, strategies, |text| meets_quality_bar(text)) {
        Some((strategy, text)) => {
            debug!(
                "Description extracted by '{}' ({} chars)",
                strategy,
                text.chars().count()
            );
            Ok(text)
        }
        None => Err(ExtractionQualityError),
    }
}

fn meets_quality_bar(text: &str) -> bool {
    text.chars().count() >= MIN_CONTENT_CHARS
}

/// Parses an HTML block and flattens its visible text to a single clean line.
fn flatten_html(html: &str) -> String {
    clean_text(&Page::parse_fragment(html).text("\n"))
}

fn readability_summary(posting: &PostingPage<'_>) -> Option<String> {
    let depth = posting.page.depth();
    if depth > MAX_READABILITY_DEPTH {
        debug!(
            "Skipping readability: nesting depth {} exceeds {}",
            depth, MAX_READABILITY_DEPTH
        );
        return None;
    }

    let base = Url::parse(READABILITY_BASE_URL).ok()?;
    let mut cursor = Cursor::new(posting.html.as_bytes());
    match readability::extractor::extract(&mut cursor, &base) {
        Ok(product) => Some(flatten_html(&product.content)),
        Err(e) => {
            debug!("Readability extraction failed: {:?}", e);
            None
        }
    }
}

/// Collects block-level text from the first content root that carries enough
/// of it, falling back to every readable text node in the body.
fn general_content(posting: &PostingPage<'_>) -> Option<String> {
    let page = posting.page;

    for css in CONTENT_ROOTS {
        let Some(root) = page.select(css).into_iter().next() else {
            continue;
        };
        let text = clean_text(&block_text(root));
        if meets_quality_bar(&text) {
            return Some(text);
        }
    }

    let body = page.select("body").into_iter().next()?;
    Some(clean_text(&readable_text(body)))
}

/// Text of outermost block elements under `root`, skipping boilerplate.
///
/// Single pre-order pass: boilerplate subtrees are pruned on entry and a
/// block element is read whole without descending further, so nested blocks
/// are never visited twice.
fn block_text(root: ElementRef<'_>) -> String {
    if in_boilerplate(root) {
        return String::new();
    }

    let mut blocks = Vec::new();
    let mut stack: Vec<_> = root.children().collect();
    stack.reverse();
    while let Some(node) = stack.pop() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        if is_boilerplate_element(el) {
            continue;
        }
        if BLOCK_TAGS.contains(&el.value().name()) {
            let text = collect_readable(el);
            if !text.trim().is_empty() {
                blocks.push(text);
            }
            continue;
        }
        let children: Vec<_> = node.children().collect();
        stack.extend(children.into_iter().rev());
    }
    blocks.join("\n")
}

/// Every visible text node under `root` outside boilerplate subtrees.
fn readable_text(root: ElementRef<'_>) -> String {
    if in_boilerplate(root) {
        return String::new();
    }
    collect_readable(root)
}

/// `readable_text` for a root already known to sit outside boilerplate.
fn collect_readable(root: ElementRef<'_>) -> String {
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
        if node.id() != root.id() && ElementRef::wrap(node).is_some_and(is_boilerplate_element) {
            continue;
        }
        let children: Vec<_> = node.children().collect();
        stack.extend(children.into_iter().rev());
    }
    parts.join("\n")
}

/// Whether `el` or any ancestor is boilerplate. Walks the ancestor chain once,
/// so callers use it for walk roots only.
fn in_boilerplate(el: ElementRef<'_>) -> bool {
    std::iter::once(el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .any(is_boilerplate_element)
}

fn is_boilerplate_element(el: ElementRef<'_>) -> bool {
    let element = el.value();
    if BOILERPLATE_TAGS.contains(&element.name()) {
        return true;
    }
    ["class", "id"].iter().any(|attr| {
        element.attr(attr).is_some_and(|value| {
            let value = value.to_lowercase();
            BOILERPLATE_MARKERS.iter().any(|marker| value.contains(marker))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAGRAPH: &str = "We are looking for a backend engineer to design, build and operate \
        the services behind our hiring platform. You will own APIs end to end, work closely \
        with product and data teams, and mentor other engineers on the team.";

    fn posting_page() -> String {
        format!(
            r#"<html><head><title>Backend Engineer</title></head><body>
                <nav class="navbar"><a href="/">Home</a><a href="/jobs">Jobs</a></nav>
                <div class="cookie-banner">We use cookies. Accept all cookies?</div>
                <article>
                    <h1>Backend Engineer</h1>
                    <p>{PARAGRAPH}</p>
                    <h2>Requirements</h2>
                    <ul><li>5+ years of Rust or Go</li><li>Experience with PostgreSQL</li></ul>
                    <p>{PARAGRAPH}</p>
                </article>
                <footer>Copyright Acme Inc. All rights reserved.</footer>
            </body></html>"#
        )
    }

    fn long_text(_: &PostingPage<'_>) -> Option<String> {
        Some("a".repeat(MIN_CONTENT_CHARS))
    }

    fn short_text(_: &PostingPage<'_>) -> Option<String> {
        Some("short".to_string())
    }

    fn failing(_: &PostingPage<'_>) -> Option<String> {
        None
    }

    fn secondary(_: &PostingPage<'_>) -> Option<String> {
        Some("b".repeat(MIN_CONTENT_CHARS + 10))
    }

    fn run(
        primary: fn(&PostingPage<'_>) -> Option<String>,
        fallback: fn(&PostingPage<'_>) -> Option<String>,
    ) -> Result<String, ExtractionQualityError> {
        let page = Page::parse("<html></html>");
        let posting = PostingPage {
            html: "<html></html>",
            page: &page,
        };
        let strategies: [Strategy<PostingPage<'_>, String>; 2] = [
            Strategy::new("primary", primary),
            Strategy::new("secondary", fallback),
        ];
        run_strategies(&posting, &strategies)
    }

    fn general_text(html: &str) -> Option<String> {
        let page = Page::parse(html);
        general_content(&PostingPage { html, page: &page })
    }

    fn nested_divs(depth: usize) -> String {
        format!(
            "<html><body>{}<p>{PARAGRAPH}</p>{}</body></html>",
            "<div>".repeat(depth),
            "</div>".repeat(depth)
        )
    }

    #[test]
    fn test_primary_strategy_wins_when_long_enough() {
        let text = run(long_text, secondary).unwrap();
        assert_eq!(text, "a".repeat(MIN_CONTENT_CHARS));
    }

    #[test]
    fn test_short_primary_falls_back_to_secondary() {
        let text = run(short_text, secondary).unwrap();
        assert!(text.starts_with('b'));
    }

    #[test]
    fn test_failed_primary_falls_back_to_secondary() {
        assert!(run(failing, secondary).is_ok());
    }

    #[test]
    fn test_both_short_fails_quality_gate() {
        let err = run(short_text, failing).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not extract sufficient content from the job posting."
        );
    }

    #[test]
    fn test_extract_description_from_article_page() {
        let text = extract_description(&posting_page()).unwrap();
        assert!(text.chars().count() >= MIN_CONTENT_CHARS);
        assert!(text.contains("backend engineer to design, build and operate"));
        assert!(!text.contains('\n'));
        assert!(!text.contains("  "));
    }

    #[test]
    fn test_extract_description_rejects_thin_page() {
        let html = "<html><body><nav>Home | Jobs</nav><p>Apply now!</p></body></html>";
        assert_eq!(extract_description(html), Err(ExtractionQualityError));
    }

    #[test]
    fn test_extract_description_rejects_empty_input() {
        assert_eq!(extract_description(""), Err(ExtractionQualityError));
    }

    #[test]
    fn test_general_content_strips_boilerplate() {
        let text = general_text(&posting_page()).unwrap();
        assert!(text.contains("5+ years of Rust or Go"));
        assert!(text.contains("Requirements"));
        assert!(!text.contains("cookies"));
        assert!(!text.contains("Copyright"));
        assert!(!text.contains("Home"));
    }

    #[test]
    fn test_general_content_does_not_duplicate_nested_blocks() {
        let html = format!(
            "<html><body><main><ul><li><p>{PARAGRAPH}</p></li></ul><p>{PARAGRAPH}</p></main></body></html>"
        );
        let text = general_text(&html).unwrap();
        assert_eq!(text.matches("mentor other engineers").count(), 2);
    }

    #[test]
    fn test_general_content_falls_back_to_body_text() {
        let html = format!(
            "<html><body><div class=\"job\"><span>{PARAGRAPH}</span></div>\
             <footer>Footer links</footer></body></html>"
        );
        let text = general_text(&html).unwrap();
        assert!(text.contains("mentor other engineers"));
        assert!(!text.contains("Footer links"));
    }

    #[test]
    fn test_readability_skipped_beyond_depth_cap() {
        let html = nested_divs(MAX_READABILITY_DEPTH + 10);
        let page = Page::parse(&html);
        assert!(readability_summary(&PostingPage { html: &html, page: &page }).is_none());
    }

    #[test]
    fn test_pathologically_nested_page_falls_back_to_general_sweep() {
        let html = nested_divs(20_000);
        let text = extract_description(&html).unwrap();
        assert!(text.contains("mentor other engineers"));
    }

    #[test]
    fn test_blocks_at_every_nesting_level_are_collected_once() {
        let level = "<div><p>level</p>";
        let html = format!(
            "<html><body><main>{}</main></body></html>",
            level.repeat(3_000)
        );
        let text = general_text(&html).unwrap();
        assert_eq!(text.matches("level").count(), 3_000);
    }

    #[test]
    fn test_boilerplate_ancestor_of_content_root_suppresses_it() {
        let html = format!(
            "<html><body><div class=\"sidebar\"><article><p>{PARAGRAPH}</p></article></div>\
             <main><p>{PARAGRAPH} Main column.</p></main></body></html>"
        );
        let text = general_text(&html).unwrap();
        assert!(text.ends_with("Main column."));
    }
}
