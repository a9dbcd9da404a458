//! Generic article extraction, the catch-all adapter.

use std::sync::LazyLock;

use readability::extractor;
use scraper::{Html, Selector};
use tracing::debug;

use crate::extractor::{
    cleaner::{normalize_whitespace, sanitize_html},
    date::format_published,
    dom,
    errors::ExtractError,
    model::{ContentKind, ContentRecord},
};
use crate::page::PageContext;

static OG_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[property='og:title']").unwrap());
static OG_SITE_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[property='og:site_name']").unwrap());
static META_AUTHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[name='author']").unwrap());
static PUBLISHED_TIME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[property='article:published_time']").unwrap());
static PUBDATE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[name='pubdate']").unwrap());
static TIME_DATETIME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("time[datetime]").unwrap());

/// What the readability pass recovered, if anything.
#[derive(Debug, Default)]
struct Readable {
    title: String,
    text: String,
    html: String,
}

pub fn can_handle(_ctx: &PageContext) -> bool {
    true
}

pub fn extract(ctx: &PageContext) -> Result<ContentRecord, ExtractError> {
    let readable = read(ctx);
    let document = ctx.document();

    let title = Some(readable.title.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| dom::attr(&document, &OG_TITLE, "content"))
        .unwrap_or_default();
    let author = dom::attr(&document, &META_AUTHOR, "content");
    let site_name = dom::attr(&document, &OG_SITE_NAME, "content")
        .unwrap_or_else(|| ctx.hostname().trim_start_matches("www.").to_string());
    let date = published_time(&document).and_then(|raw| format_published(&raw));

    let text = if readable.text.trim().is_empty() {
        debug!("readability found no text, using the rendered page");
        dom::body_text(&document)
    } else {
        normalize_whitespace(&readable.text)
    };
    let html = Some(readable.html)
        .filter(|h| !h.trim().is_empty())
        .map(|h| sanitize_html(&h, ctx.url()));

    Ok(
        ContentRecord::new(ContentKind::Article, ctx, title, site_name, text)?
            .with_author(author)
            .with_date(date)
            .with_html(html),
    )
}

/// Run readability over its own parse of the snapshot.
fn read(ctx: &PageContext) -> Readable {
    match extractor::extract(&mut ctx.html().as_bytes(), ctx.url()) {
        Ok(product) => Readable {
            title: product.title,
            text: product.text,
            html: product.content,
        },
        Err(err) => {
            debug!(error = ?err, "readability failed");
            Readable::default()
        }
    }
}

fn published_time(document: &Html) -> Option<String> {
    dom::attr(document, &PUBLISHED_TIME, "content")
        .or_else(|| dom::attr(document, &PUBDATE, "content"))
        .or_else(|| dom::attr(document, &TIME_DATETIME, "datetime"))
}
