use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::extractor::errors::ExtractError;
use crate::page::PageContext;

/// Which extractor produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Article,
    Wikipedia,
    Gdoc,
    Gslides,
    Pdf,
}

impl ContentKind {
    pub const ALL: [ContentKind; 5] = [
        ContentKind::Article,
        ContentKind::Wikipedia,
        ContentKind::Gdoc,
        ContentKind::Gslides,
        ContentKind::Pdf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Article => "article",
            ContentKind::Wikipedia => "wikipedia",
            ContentKind::Gdoc => "gdoc",
            ContentKind::Gslides => "gslides",
            ContentKind::Pdf => "pdf",
        }
    }

    /// Label shown next to the headline.
    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Article => "Article",
            ContentKind::Wikipedia => "Wikipedia",
            ContentKind::Gdoc => "Google Doc",
            ContentKind::Gslides => "Google Slides",
            ContentKind::Pdf => "PDF",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extractor-specific side data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordMeta {
    Pdf {
        #[serde(rename = "totalPages")]
        total_pages: usize,
        #[serde(rename = "parsedPages")]
        parsed_pages: usize,
    },
    Slides {
        #[serde(rename = "slideCount")]
        slide_count: usize,
    },
}

/// The normalized result of one extraction.
///
/// Built once per run and never mutated by consumers; `text` and `title`
/// are guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    kind: ContentKind,
    url: Url,
    title: String,
    source: String,
    author: Option<String>,
    date: Option<String>,
    text: String,
    html: Option<String>,
    meta: Option<RecordMeta>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ContentRecord {
    /// Start a record for `ctx`. An empty `title` falls back to the document
    /// title, then the hostname; empty `text` is an error.
    pub fn new(
        kind: ContentKind,
        ctx: &PageContext,
        title: impl Into<String>,
        source: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Self, ExtractError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ExtractError::EmptyContent(kind));
        }

        let title = non_empty(Some(title.into()))
            .or_else(|| non_empty(Some(ctx.title().to_string())))
            .or_else(|| non_empty(Some(ctx.hostname().to_string())))
            .unwrap_or_else(|| kind.label().to_string());

        Ok(Self {
            kind,
            url: ctx.url().clone(),
            title,
            source: source.into(),
            author: None,
            date: None,
            text,
            html: None,
            meta: None,
        })
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = non_empty(author);
        self
    }

    pub fn with_date(mut self, date: Option<String>) -> Self {
        self.date = non_empty(date);
        self
    }

    pub fn with_html(mut self, html: Option<String>) -> Self {
        self.html = non_empty(html);
        self
    }

    pub fn with_meta(mut self, meta: RecordMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Replace the text after truncation. Callers never pass empty text.
    pub(crate) fn with_text(mut self, text: String) -> Self {
        self.text = text;
        self
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }
    pub fn url(&self) -> &Url {
        &self.url
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn source(&self) -> &str {
        &self.source
    }
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }
    pub fn text(&self) -> &str {
        &self.text
    }
    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }
    pub fn meta(&self) -> Option<RecordMeta> {
        self.meta
    }
}
