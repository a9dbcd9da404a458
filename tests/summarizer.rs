use page_digest::config::Config;
use page_digest::digest::{SummarizeError, Summarizer, SummaryInput};
use page_digest::extractor::ContentKind;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

fn input() -> SummaryInput {
    SummaryInput {
        kind: ContentKind::Wikipedia,
        title: "Hermit crab".to_string(),
        site: Some("Wikipedia".to_string()),
        date: None,
        text: "Hermit crabs live in salvaged shells.".to_string(),
    }
}

fn summarizer(server: &MockServer) -> Summarizer {
    Summarizer::new(Config::new(true, server.uri(), "sk-test", "test-model"))
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    }))
}

#[tokio::test]
async fn test_summarize_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "test-model", "temperature": 0.2 })))
        .respond_with(completion(
            r#"{"tldr": "Crabs borrow shells.", "key_points": ["They move up in size."], "quote_highlights": ["salvaged shells"]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let digest = summarizer(&server).summarize(&input()).await.unwrap();

    assert_eq!(digest.tldr, "Crabs borrow shells.");
    assert_eq!(digest.key_points, vec!["They move up in size."]);
    assert!(digest.unverified_quotes(&input().text).is_empty());
}

#[tokio::test]
async fn test_summarize_tolerates_fences_and_chatter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion(
            "Here you go:\n```json\n{\"tldr\": \"Fenced.\", \"why_it_matters\": [\"Shells are scarce.\"]}\n```",
        ))
        .mount(&server)
        .await;

    let digest = summarizer(&server).summarize(&input()).await.unwrap();
    assert_eq!(digest.tldr, "Fenced.");
    assert_eq!(digest.why_it_matters, vec!["Shells are scarce."]);
}

#[tokio::test]
async fn test_summarize_http_error() {
    let server = MockServer::start().await;
    let body = "x".repeat(1000);
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string(body))
        .mount(&server)
        .await;

    let err = summarizer(&server).summarize(&input()).await.unwrap_err();
    match &err {
        SummarizeError::Http { status, body } => {
            assert_eq!(*status, 429);
            assert_eq!(body.len(), 300);
        }
        other => panic!("Expected Http error, got {other:?}"),
    }
    assert!(err.should_retry());
}

#[tokio::test]
async fn test_summarize_malformed_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion("I would rather not."))
        .mount(&server)
        .await;

    let err = summarizer(&server).summarize(&input()).await.unwrap_err();
    assert!(matches!(err, SummarizeError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_disabled_summarizer_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("{}"))
        .expect(0)
        .mount(&server)
        .await;

    let disabled = Summarizer::new(Config::new(false, server.uri(), "sk-test", "test-model"));
    let err = disabled.summarize(&input()).await.unwrap_err();
    assert!(matches!(err, SummarizeError::NotConfigured));
}
