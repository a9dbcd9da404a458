use scraper::{Html, Selector};
use url::Url;

use crate::fetcher::PageResponse;

/// A snapshot of the active document.
#[derive(Debug, Clone)]
pub struct PageContext {
    url: Url,
    content_type: Option<String>,
    title: String,
    html: String,
}

impl PageContext {
    /// Build a context from a serialized DOM; the title is read from `<title>`.
    pub fn new(url: Url, html: impl Into<String>) -> Self {
        let html = html.into();
        let title = document_title(&html);
        Self {
            url,
            content_type: None,
            title,
            html,
        }
    }

    /// A document with no DOM of its own, such as a PDF opened in the viewer.
    pub fn bare(url: Url, content_type: impl Into<String>) -> Self {
        Self {
            url,
            content_type: Some(content_type.into()),
            title: String::new(),
            html: String::new(),
        }
    }

    pub fn from_response(resp: &PageResponse) -> Self {
        Self::new(resp.url_final.clone(), resp.body_utf8.clone())
            .with_content_type(resp.content_type.clone())
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn hostname(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// MIME type without parameters, lowercased.
    pub fn content_type(&self) -> Option<String> {
        self.content_type.as_deref().map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Parse a fresh copy of the DOM. The snapshot itself is never touched.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

fn document_title(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}
