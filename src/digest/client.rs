use std::time::Duration;

use reqwest::{Client, ClientBuilder, header};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::digest::{
    errors::SummarizeError,
    model::{Digest, SummaryInput},
    parse::parse_digest,
    prompt::{system_prompt, user_message},
};
use crate::extractor::ContentRecord;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const TEMPERATURE: f64 = 0.2;
const ERROR_BODY_CHARS: usize = 300;

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completion client for producing a [`Digest`].
#[derive(Debug, Clone)]
pub struct Summarizer {
    config: Config,
    client: Client,
}

impl Summarizer {
    pub fn new(config: Config) -> Self {
        let client = ClientBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { config, client }
    }

    pub async fn summarize_record(&self, record: &ContentRecord) -> Result<Digest, SummarizeError> {
        let digest = self.summarize(&SummaryInput::from(record)).await?;

        let unverified = digest.unverified_quotes(record.text());
        if !unverified.is_empty() {
            warn!(count = unverified.len(), quotes = ?unverified, "quotes not found in source text");
        }
        Ok(digest)
    }

    #[instrument(skip_all, fields(kind = %input.kind, model = %self.config.model()))]
    pub async fn summarize(&self, input: &SummaryInput) -> Result<Digest, SummarizeError> {
        if !self.config.is_configured() {
            return Err(SummarizeError::NotConfigured);
        }

        let body = json!({
            "model": self.config.model(),
            "temperature": TEMPERATURE,
            "messages": [
                { "role": "system", "content": system_prompt(input.kind) },
                { "role": "user", "content": user_message(input) },
            ],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url()))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.config.api_key()))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SummarizeError::Http {
                status: status.as_u16(),
                body: text.chars().take(ERROR_BODY_CHARS).collect(),
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| SummarizeError::MalformedResponse(e.to_string()))?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        let digest = parse_digest(&content)?;
        info!(key_points = digest.key_points.len(), "summary received");
        Ok(digest)
    }
}
