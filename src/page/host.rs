use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::fetcher::{self, FetchError};

/// Heavy optional libraries an extractor may need before it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
    PdfParser,
}

impl Dependency {
    pub fn name(&self) -> &'static str {
        match self {
            Dependency::PdfParser => "pdf-parser",
        }
    }
}

/// Services the surrounding environment provides to extractors.
#[async_trait]
pub trait Host: Send + Sync {
    /// Download a resource's raw bytes.
    async fn fetch_bytes(&self, url: &Url) -> Result<Bytes, FetchError>;

    /// Whether `dep` is already available in this execution context.
    fn is_loaded(&self, dep: Dependency) -> bool;

    /// Make `dep` available. Errors are human-readable reasons.
    async fn load_optional_parser(&self, dep: Dependency) -> Result<(), String>;

    /// Hand control back to the scheduler between units of work.
    async fn yield_now(&self) {
        tokio::task::yield_now().await;
    }
}

/// Production host: downloads over HTTP with the shared client.
///
/// The PDF parser is linked into the binary, so it is always loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpHost;

#[async_trait]
impl Host for HttpHost {
    async fn fetch_bytes(&self, url: &Url) -> Result<Bytes, FetchError> {
        Ok(fetcher::fetch_bytes(url).await?.body)
    }

    fn is_loaded(&self, dep: Dependency) -> bool {
        match dep {
            Dependency::PdfParser => true,
        }
    }

    async fn load_optional_parser(&self, _dep: Dependency) -> Result<(), String> {
        Ok(())
    }
}
