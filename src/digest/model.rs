use serde::{Deserialize, Serialize};

use crate::extractor::{ContentKind, ContentRecord};

/// Structured summary returned by the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    pub tldr: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub why_it_matters: Vec<String>,
    #[serde(default)]
    pub what_to_watch_next: Vec<String>,
    #[serde(default)]
    pub quote_highlights: Vec<String>,
    #[serde(default)]
    pub bias_or_uncertainty: Vec<String>,
}

impl Digest {
    /// Quotes that do not occur verbatim in `text`.
    pub fn unverified_quotes<'a>(&'a self, text: &str) -> Vec<&'a str> {
        self.quote_highlights
            .iter()
            .map(String::as_str)
            .filter(|quote| !text.contains(quote.trim_matches('"')))
            .collect()
    }
}

/// The part of a record the summarizer sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryInput {
    pub kind: ContentKind,
    pub title: String,
    pub site: Option<String>,
    pub date: Option<String>,
    pub text: String,
}

impl From<&ContentRecord> for SummaryInput {
    fn from(record: &ContentRecord) -> Self {
        Self {
            kind: record.kind(),
            title: record.title().to_string(),
            site: Some(record.source().to_string()).filter(|s| !s.is_empty()),
            date: record.date().map(str::to_string),
            text: record.text().to_string(),
        }
    }
}
