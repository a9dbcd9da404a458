//! Google Docs extraction.
//!
//! The editor renders each line through its own paragraph node, which gives
//! the richest result; the remaining strategies read progressively larger
//! regions of the editor.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use crate::extractor::{
    dom,
    errors::ExtractError,
    model::{ContentKind, ContentRecord},
    strategy::{Strategy, run_ladder},
};
use crate::page::PageContext;

/// Below this a strategy's output counts as failed.
const MIN_STRATEGY_CHARS: usize = 50;
/// Below this nothing usable was found at all.
const MIN_DOCUMENT_CHARS: usize = 20;

pub const CANVAS_GUIDANCE: &str = "Could not extract text from this Google Doc. It may use \
    canvas-based rendering. Try File → Download → Plain Text (.txt) and open that file instead.";

static PARAGRAPHS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".kix-paragraphrenderer").unwrap());
static HEADING_STYLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[style*="font-size: 2"], [style*="font-weight: 700"]"#).unwrap()
});
static EDITABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[contenteditable="true"]"#).unwrap());
static EDITOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".kix-appview-editor, #docs-editor-container, .docs-editor").unwrap()
});
static ARIA_CONTENT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[aria-label="Document content"], [role="textbox"]"#).unwrap()
});
static TITLE_INPUT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".docs-title-input").unwrap());

/// Text from one strategy, with a structural HTML mirror when available.
#[derive(Debug, Clone, PartialEq)]
pub struct DocText {
    pub text: String,
    pub html: Option<String>,
}

impl DocText {
    fn plain(text: String) -> Self {
        Self { text, html: None }
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }
}

pub const STRATEGIES: [Strategy<DocText>; 4] = [
    Strategy::new("paragraph-renderers", paragraph_renderers),
    Strategy::new("contenteditable", editable_region),
    Strategy::new("editor-container", editor_container),
    Strategy::new("aria-document", aria_document),
];

pub fn can_handle(ctx: &PageContext) -> bool {
    ctx.hostname() == "docs.google.com" && ctx.path().starts_with("/document/")
}

pub fn extract(ctx: &PageContext) -> Result<ContentRecord, ExtractError> {
    let document = ctx.document();

    let title = dom::attr(&document, &TITLE_INPUT, "value").unwrap_or_else(|| {
        ctx.title()
            .trim_end_matches(" - Google Docs")
            .trim()
            .to_string()
    });

    let found = run_ladder(&STRATEGIES, &document, |doc| doc.len() >= MIN_STRATEGY_CHARS);
    let doc = match found {
        Some((strategy, doc)) if doc.len() >= MIN_DOCUMENT_CHARS => {
            info!(strategy, chars = doc.len(), "google doc text extracted");
            doc
        }
        _ => {
            warn!("every google docs strategy came up short");
            return Err(ExtractError::Insufficient(CANVAS_GUIDANCE.to_string()));
        }
    };

    Ok(
        ContentRecord::new(ContentKind::Gdoc, ctx, title, "Google Docs", doc.text)?
            .with_html(doc.html),
    )
}

fn paragraph_renderers(document: &Html) -> Option<DocText> {
    let paragraphs: Vec<_> = document.select(&PARAGRAPHS).collect();
    if paragraphs.is_empty() {
        return None;
    }

    let mut lines = Vec::new();
    let mut html = Vec::new();
    for paragraph in paragraphs {
        let line = dom::rendered_text(paragraph);
        if line.is_empty() {
            continue;
        }
        let tag = if is_heading(paragraph) { "h2" } else { "p" };
        html.push(format!("<{tag}>{}</{tag}>", escape_html(&line)));
        lines.push(line);
    }

    Some(DocText {
        text: lines.join("\n\n"),
        html: Some(html.join("\n")),
    })
}

/// A heading either sits under a heading-classed ancestor or carries large
/// or bold inline styling.
fn is_heading(paragraph: ElementRef<'_>) -> bool {
    let heading_class = |el: ElementRef<'_>| {
        el.value()
            .attr("class")
            .is_some_and(|class| class.contains("heading"))
    };

    heading_class(paragraph)
        || paragraph
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(heading_class)
        || paragraph.select(&HEADING_STYLE).next().is_some()
}

fn region_text(document: &Html, selector: &Selector) -> Option<DocText> {
    dom::first(document, selector).map(|el| DocText::plain(dom::rendered_text(el)))
}

fn editable_region(document: &Html) -> Option<DocText> {
    region_text(document, &EDITABLE)
}

fn editor_container(document: &Html) -> Option<DocText> {
    region_text(document, &EDITOR)
}

fn aria_document(document: &Html) -> Option<DocText> {
    region_text(document, &ARIA_CONTENT)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
