use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("LLM not configured. Set DIGEST_LLM_API_KEY (and DIGEST_LLM_ENABLED=true) to enable summaries.")]
    NotConfigured,

    #[error("API {status}: {body}")]
    Http { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("Failed to parse LLM response as JSON: {0}")]
    MalformedResponse(String),
}

impl SummarizeError {
    pub fn should_retry(&self) -> bool {
        match self {
            Self::NotConfigured => false,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::Transport(_) => true,
            Self::MalformedResponse(_) => true,
        }
    }
}

impl From<reqwest::Error> for SummarizeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
