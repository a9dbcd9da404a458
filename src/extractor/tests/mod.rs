use async_trait::async_trait;
use bytes::Bytes;
use std::fs;
use std::sync::Mutex;
use url::Url;

use crate::extractor::truncate::{END_MARKER, MIDDLE_MARKER};
use crate::extractor::{ContentKind, ExtractError, RecordMeta, extract, resolve};
use crate::fetcher::FetchError;
use crate::page::{Dependency, Host, PageContext, Progress};

/// Host with no network, recording dependency loads.
#[derive(Default)]
struct OfflineHost {
    missing_parser: bool,
    load_error: Option<String>,
    loads: Mutex<Vec<Dependency>>,
}

#[async_trait]
impl Host for OfflineHost {
    async fn fetch_bytes(&self, _url: &Url) -> Result<Bytes, FetchError> {
        Err(FetchError::Connect("offline".to_string()))
    }

    fn is_loaded(&self, _dep: Dependency) -> bool {
        !self.missing_parser
    }

    async fn load_optional_parser(&self, dep: Dependency) -> Result<(), String> {
        self.loads.lock().unwrap().push(dep);
        match &self.load_error {
            Some(reason) => Err(reason.clone()),
            None => Ok(()),
        }
    }
}

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}

fn page(url: &str, html: String) -> PageContext {
    PageContext::new(Url::parse(url).unwrap(), html)
}

#[tokio::test]
async fn test_extract_article() {
    let ctx = page(
        "https://www.coastaltimes.example/science/tide-pools",
        fixture("article.html"),
    );
    let record = extract(&ctx, &OfflineHost::default(), Progress::none())
        .await
        .unwrap();

    assert_eq!(record.kind(), ContentKind::Article);
    assert!(record.title().contains("Tide Pools"));
    assert_eq!(record.source(), "Coastal Times");
    assert_eq!(record.author(), Some("Marina Reyes"));
    assert_eq!(record.date(), Some("March 5, 2024"));
    assert!(record.text().contains("first paragraph"));
    assert!(record.text().contains("second paragraph"));
    assert!(!record.text().contains("window.analytics"));

    let html = record.html().expect("readability html");
    assert!(!html.contains("<script"));
    assert!(!html.contains("<style"));
}

#[tokio::test]
async fn test_extract_wikipedia() {
    let ctx = page(
        "https://en.wikipedia.org/wiki/Hermit_crab",
        fixture("wikipedia.html"),
    );
    let record = extract(&ctx, &OfflineHost::default(), Progress::none())
        .await
        .unwrap();

    assert_eq!(record.kind(), ContentKind::Wikipedia);
    assert_eq!(record.title(), "Hermit crab");
    assert!(
        record
            .text()
            .contains("of the superfamily Paguroidea. Most species")
    );
    assert!(record.text().contains("empty seashells. As they grow"));
    assert!(!record.text().contains("For the album"));
    assert!(!record.text().contains("additional citations"));
    assert!(!record.text().contains("Temporal range"));
    assert!(!record.text().contains("Contents"));
    assert!(!record.text().contains("edit"));
    assert!(!record.text().contains("Smith, J."));
    assert!(!record.text().contains("Decapoda navigation"));
    assert!(!record.text().contains("\n\n\n"));
    assert!(!regex::Regex::new(r"\[\d+\]").unwrap().is_match(record.text()));
}

#[tokio::test]
async fn test_wikipedia_strips_inline_markers() {
    let html = r#"<html><body><h1 id="firstHeading">Foo</h1><div id="mw-content-text">
        <div class="mw-parser-output"><p>Foo[12] bar</p></div></div></body></html>"#;
    let ctx = page("https://en.wikipedia.org/wiki/Foo", html.to_string());
    let record = extract(&ctx, &OfflineHost::default(), Progress::none())
        .await
        .unwrap();
    assert_eq!(record.text(), "Foo bar");
}

#[tokio::test]
async fn test_extract_google_doc() {
    let ctx = page(
        "https://docs.google.com/document/d/1LaunchPlan/edit",
        fixture("gdoc.html"),
    );
    let record = extract(&ctx, &OfflineHost::default(), Progress::none())
        .await
        .unwrap();

    assert_eq!(record.kind(), ContentKind::Gdoc);
    assert_eq!(record.title(), "Launch Plan");
    assert_eq!(record.source(), "Google Docs");
    assert!(record.text().starts_with("Launch Plan\n\nThe launch moves"));
    assert!(record.text().contains("first weekend & needs a rota."));

    let html = record.html().unwrap();
    assert!(html.contains("<h2>Launch Plan</h2>"));
    assert!(html.contains("<h2>Risks</h2>"));
    assert!(html.contains("<p>Support staffing is thin during the first weekend &amp; needs a rota.</p>"));
}

#[tokio::test]
async fn test_long_google_doc_is_sampled() {
    let paragraph = "Long planning documents keep going well past what a summary needs. ";
    let body = paragraph.repeat(200_000 / paragraph.len() + 1);
    let body = &body[..200_000];
    let html = format!(
        r#"<html><head><title>Huge - Google Docs</title></head><body>
           <div contenteditable="true">{body}</div></body></html>"#
    );
    let ctx = page("https://docs.google.com/document/d/1Huge/edit", html);
    let record = extract(&ctx, &OfflineHost::default(), Progress::none())
        .await
        .unwrap();

    assert!(record.text().contains(MIDDLE_MARKER));
    assert!(record.text().contains(END_MARKER));
    assert!(record.text().chars().count() < 200_000);
}

#[tokio::test]
async fn test_canvas_google_doc_fails_with_guidance() {
    let html = r#"<html><head><title>Canvas - Google Docs</title></head><body>
        <div class="kix-appview-editor"><canvas width="800" height="1000"></canvas></div>
        <div role="textbox"> </div></body></html>"#;
    let ctx = page("https://docs.google.com/document/d/1Canvas/edit", html.to_string());
    let err = extract(&ctx, &OfflineHost::default(), Progress::none())
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::Insufficient(_)));
    assert!(err.user_message().contains("Download → Plain Text"));
}

#[tokio::test]
async fn test_extract_google_slides() {
    let ctx = page(
        "https://docs.google.com/presentation/d/1Review/edit",
        fixture("gslides.html"),
    );
    let record = extract(&ctx, &OfflineHost::default(), Progress::none())
        .await
        .unwrap();

    assert_eq!(record.kind(), ContentKind::Gslides);
    assert_eq!(record.title(), "Quarterly Review");
    assert_eq!(
        record.text(),
        "Slide 1:\nQuarterly Review\nRevenue up 12%\n\nSlide 2:\nNext steps\nHire two engineers\n\n--- Speaker Notes ---\nMention the churn numbers only if asked."
    );
    assert_eq!(record.meta(), Some(RecordMeta::Slides { slide_count: 2 }));
}

#[tokio::test]
async fn test_extraction_is_idempotent() {
    let host = OfflineHost::default();
    for (url, name) in [
        ("https://www.coastaltimes.example/science/tide-pools", "article.html"),
        ("https://en.wikipedia.org/wiki/Hermit_crab", "wikipedia.html"),
        ("https://docs.google.com/document/d/1LaunchPlan/edit", "gdoc.html"),
        ("https://docs.google.com/presentation/d/1Review/edit", "gslides.html"),
    ] {
        let ctx = page(url, fixture(name));
        let first = extract(&ctx, &host, Progress::none()).await.unwrap();
        let second = extract(&ctx, &host, Progress::none()).await.unwrap();
        assert_eq!(first.title(), second.title());
        assert_eq!(first.text(), second.text());
        assert_eq!(first.kind(), resolve(&ctx).unwrap().kind());
    }
}

#[tokio::test]
async fn test_missing_parser_is_loaded_before_pdf_download() {
    let host = OfflineHost {
        missing_parser: true,
        ..Default::default()
    };
    let ctx = PageContext::bare(
        Url::parse("https://example.com/paper.pdf").unwrap(),
        "application/pdf",
    );
    let seen = Mutex::new(Vec::new());
    let sink = |msg: &str| seen.lock().unwrap().push(msg.to_string());

    let err = extract(&ctx, &host, Progress::new(&sink)).await.unwrap_err();

    // parser loads, then the offline download fails
    assert_eq!(*host.loads.lock().unwrap(), vec![Dependency::PdfParser]);
    assert!(matches!(err, ExtractError::Download(_)));
    assert!(err.user_message().starts_with("Failed to download PDF: "));
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["Loading PDF parser…", "Downloading PDF…"]
    );
}

#[tokio::test]
async fn test_parser_load_failure_propagates() {
    let host = OfflineHost {
        missing_parser: true,
        load_error: Some("script blocked".to_string()),
        ..Default::default()
    };
    let ctx = PageContext::bare(
        Url::parse("https://example.com/paper.pdf").unwrap(),
        "application/pdf",
    );

    let err = extract(&ctx, &host, Progress::none()).await.unwrap_err();
    match err {
        ExtractError::DependencyLoad { dependency, reason } => {
            assert_eq!(dependency, "pdf-parser");
            assert_eq!(reason, "script blocked");
        }
        other => panic!("Expected DependencyLoad, got {other:?}"),
    }
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_resolution_never_fails(
            path in "/[a-z/._-]{0,40}",
            host in "(en\\.wikipedia\\.org|docs\\.google\\.com|drive\\.google\\.com|[a-z]{1,12}\\.com)",
        ) {
            let ctx = page(&format!("https://{host}{path}"), String::new());
            prop_assert!(resolve(&ctx).is_ok());
        }

        #[test]
        fn test_extract_never_panics(
            html in ".*",
            url in "https://[a-z]+\\.com/[a-z]*",
        ) {
            let ctx = page(&url, html);
            let rt = tokio::runtime::Runtime::new().unwrap();
            if let Ok(record) = rt.block_on(extract(&ctx, &OfflineHost::default(), Progress::none())) {
                prop_assert!(!record.text().trim().is_empty());
                prop_assert!(!record.title().trim().is_empty());
            }
        }
    }
}
