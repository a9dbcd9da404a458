use crate::digest::model::SummaryInput;
use crate::extractor::ContentKind;

/// The model never sees more than this many characters of text.
pub const MAX_INPUT_CHARS: usize = 120_000;

fn subject(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Article => "news article",
        ContentKind::Wikipedia => "encyclopedia article",
        ContentKind::Gdoc => "document",
        ContentKind::Gslides => "slide presentation",
        ContentKind::Pdf => "PDF document",
    }
}

pub fn system_prompt(kind: ContentKind) -> String {
    let subject = subject(kind);
    format!(
        r#"You are a {subject} summarizer. Return ONLY valid JSON (no markdown fences, no explanation) matching this exact schema:
{{
  "tldr": "1-2 sentence summary",
  "key_points": ["5-7 bullet points covering the main facts"],
  "why_it_matters": ["2-3 bullets on broader significance"],
  "what_to_watch_next": ["2-3 bullets on future developments"],
  "quote_highlights": ["2-4 SHORT direct quotes from the text, which must be phrases actually present in the text, not invented"],
  "bias_or_uncertainty": ["1-2 bullets noting potential bias, missing context, or unverified claims. Be cautious and fair, not accusatory. If none, return empty array."]
}}
Be faithful to the {subject}. Quotes must be verbatim from the provided text."#
    )
}

pub fn user_message(input: &SummaryInput) -> String {
    let text: String = input.text.chars().take(MAX_INPUT_CHARS).collect();

    let mut lines = vec![format!("Title: {}", input.title)];
    if let Some(site) = &input.site {
        lines.push(format!("Source: {site}"));
    }
    if let Some(date) = &input.date {
        lines.push(format!("Published: {date}"));
    }
    lines.push(format!("\nArticle text:\n{text}"));
    lines.join("\n")
}
