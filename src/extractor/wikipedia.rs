//! Wikipedia article extraction.

use std::sync::LazyLock;

use kuchiki::traits::TendrilSink;
use regex::Regex;
use scraper::Selector;

use crate::extractor::{
    cleaner::sanitize_html,
    dom,
    errors::ExtractError,
    model::{ContentKind, ContentRecord},
};
use crate::page::PageContext;

const CONTENT_ROOT: &str = "#mw-content-text .mw-parser-output";

/// Non-content subtrees removed before reading the article text.
const DENYLIST: &[&str] = &[
    ".toc",
    ".infobox",
    ".navbox",
    ".navbox-styles",
    ".reflist",
    ".reference",
    ".sidebar",
    ".mw-editsection",
    ".mw-jump-link",
    ".sistersitebox",
    ".hatnote",
    ".metadata",
    ".noprint",
    ".mw-empty-elt",
    ".vertical-navbox",
    ".mbox-small",
    ".ambox",
    ".ombox",
    ".tmbox",
    ".fmbox",
    ".cmbox",
    ".dmbox",
    ".imbox",
    "#coordinates",
    ".portal",
    "style",
    "link",
    "sup.reference",
];

static CITATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\d+\]").unwrap());
static EXTRA_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static FIRST_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#firstHeading").unwrap());

pub fn can_handle(ctx: &PageContext) -> bool {
    ctx.hostname().ends_with(".wikipedia.org") && ctx.path().starts_with("/wiki/")
}

pub fn extract(ctx: &PageContext) -> Result<ContentRecord, ExtractError> {
    let title = {
        let document = ctx.document();
        dom::first(&document, &FIRST_HEADING)
            .map(|heading| dom::text_content(heading).trim().to_string())
            .unwrap_or_default()
    };

    let (raw_text, inner_html) = strip_article(ctx.html()).ok_or_else(|| {
        ExtractError::WrongPageShape("Could not find Wikipedia article content.".to_string())
    })?;
    let text = clean_text(&raw_text);

    Ok(
        ContentRecord::new(ContentKind::Wikipedia, ctx, title, "Wikipedia", text)?
            .with_html(Some(sanitize_html(&inner_html, ctx.url()))),
    )
}

/// Re-parse the snapshot, drop the denylisted subtrees from the content
/// root and return its text and inner HTML.
fn strip_article(html: &str) -> Option<(String, String)> {
    let document = kuchiki::parse_html().one(html);
    let root = document.select_first(CONTENT_ROOT).ok()?;
    let root = root.as_node();

    let doomed: Vec<_> = root
        .select(&DENYLIST.join(","))
        .map(|matches| matches.collect())
        .unwrap_or_default();
    for element in doomed {
        element.as_node().detach();
    }

    let inner_html = root.children().map(|child| child.to_string()).collect();
    Some((root.text_contents(), inner_html))
}

/// Drop `[n]` citation markers and collapse runs of blank lines.
fn clean_text(raw: &str) -> String {
    let without_citations = CITATION.replace_all(raw, "");
    EXTRA_NEWLINES
        .replace_all(&without_citations, "\n\n")
        .trim()
        .to_string()
}
